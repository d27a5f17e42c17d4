use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::MessageModel, service::MessageService};
use crate::shared::{AppError, AppState};

/// Query parameters for the message history endpoint
#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(default)]
    pub room_id: String,
}

/// HTTP handler for fetching a room's message history
///
/// GET /messages?room_id={room_id}
/// Returns the room's messages ordered oldest first
#[instrument(name = "get_messages", skip(state))]
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageModel>>, AppError> {
    if query.room_id.is_empty() {
        return Err(AppError::BadRequest(
            "missing room_id query parameter".to_string(),
        ));
    }

    let service = MessageService::new(Arc::clone(&state.message_repository));
    let history = service.room_history(&query.room_id).await?;

    info!(
        room_id = %query.room_id,
        message_count = history.len(),
        "Message history served"
    );

    Ok(Json(history))
}
