use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::service::compose_chat_digest;
use crate::message::MessageService;
use crate::room::RoomService;
use crate::shared::{AppError, AppState};
use crate::user::models::UserModel;

/// HTTP handler for mailing a user their chat digest
///
/// POST /mailChat
/// Body: the user document; a section is composed for each room the user
/// has joined, then handed to the configured mailer.
#[instrument(name = "mail_chat", skip(state, user))]
pub async fn mail_chat(
    State(state): State<AppState>,
    Json(user): Json<UserModel>,
) -> Result<Json<Value>, AppError> {
    info!(user_id = %user.id, email = %user.email, "Composing chat digest");

    let message_service = MessageService::new(Arc::clone(&state.message_repository));
    let room_service = RoomService::new(Arc::clone(&state.room_repository));

    let mut rooms = Vec::with_capacity(user.rooms.len());
    for room_id in &user.rooms {
        let history = message_service.room_history(room_id).await?;
        // A stale sidebar entry falls back to the raw id rather than failing the digest
        let room_name = match room_service.get_room(room_id).await? {
            Some(room) => room.name,
            None => {
                warn!(room_id = %room_id, "Digest references unknown room");
                room_id.clone()
            }
        };
        rooms.push((room_name, history));
    }

    let digest = compose_chat_digest(&user, &rooms);
    let confirmation = state.email_service.send_email(&digest).await?;

    info!(user_id = %user.id, "Chat digest mailed");

    Ok(Json(json!({ "message": confirmation })))
}
