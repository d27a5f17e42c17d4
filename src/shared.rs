use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::email::EmailService;
use crate::hub::HubHandle;
use crate::message::repository::MessageRepository;
use crate::room::repository::RoomRepository;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub message_repository: Arc<dyn MessageRepository + Send + Sync>,
    pub room_repository: Arc<dyn RoomRepository + Send + Sync>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub email_service: Arc<dyn EmailService + Send + Sync>,
}

impl AppState {
    pub fn new(
        hub: HubHandle,
        message_repository: Arc<dyn MessageRepository + Send + Sync>,
        room_repository: Arc<dyn RoomRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        email_service: Arc<dyn EmailService + Send + Sync>,
    ) -> Self {
        Self {
            hub,
            message_repository,
            room_repository,
            user_repository,
            email_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Email error: {0}")]
    EmailError(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::EmailError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Email error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
