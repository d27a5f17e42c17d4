use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::UserModel,
    service::UserService,
    types::{UserAuthRequest, UserRoomsUpdateRequest},
};
use crate::shared::{AppError, AppState};

/// Query parameters for the user lookup endpoint
#[derive(Debug, Deserialize)]
pub struct UserByEmailQuery {
    #[serde(default)]
    pub email: String,
}

/// HTTP handler for fetching a user profile by email
///
/// GET /userByEmail?email={email}
#[instrument(name = "get_user_by_email", skip(state))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Query(query): Query<UserByEmailQuery>,
) -> Result<Json<UserModel>, AppError> {
    if query.email.is_empty() {
        return Err(AppError::BadRequest(
            "missing email query parameter".to_string(),
        ));
    }

    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.get_user_by_email(&query.email).await?;

    Ok(Json(user))
}

/// HTTP handler for login-less profile resolution
///
/// POST /userAuth
/// Returns the existing profile for the email or creates a new one
#[instrument(name = "auth_user", skip(state, request))]
pub async fn auth_user(
    State(state): State<AppState>,
    Json(request): Json<UserAuthRequest>,
) -> Result<Json<UserModel>, AppError> {
    if request.email.is_empty() {
        return Err(AppError::BadRequest("missing email".to_string()));
    }

    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.auth_user(request).await?;

    info!(user_id = %user.id, email = %user.email, "User resolved");

    Ok(Json(user))
}

/// HTTP handler for replacing a user's room membership list
///
/// PUT /userRooms
#[instrument(name = "update_user_rooms", skip(state, request))]
pub async fn update_user_rooms(
    State(state): State<AppState>,
    Json(request): Json<UserRoomsUpdateRequest>,
) -> Result<Json<UserModel>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service
        .update_user_rooms(&request.id, &request.rooms)
        .await?;

    Ok(Json(user))
}
