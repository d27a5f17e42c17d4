use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{models::UserModel, repository::UserRepository, types::UserAuthRequest};
use crate::shared::AppError;

/// Service for handling user profile business logic
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Fetches a user profile by id (the upgrade endpoint's identity lookup)
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        self.repository.get_user(user_id).await
    }

    /// Fetches a user profile by email, erroring when absent
    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<UserModel, AppError> {
        self.repository
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no user with email {}", email)))
    }

    /// Resolves a profile for a login: returns the existing user for the
    /// email or creates a fresh one
    #[instrument(skip(self, request))]
    pub async fn auth_user(&self, request: UserAuthRequest) -> Result<UserModel, AppError> {
        if let Some(existing) = self.repository.get_user_by_email(&request.email).await? {
            debug!(user_id = %existing.id, email = %existing.email, "Existing user resolved");
            return Ok(existing);
        }

        let user = UserModel::from_auth(request.email, request.user_image);
        self.repository.create_user(&user).await?;

        info!(
            user_id = %user.id,
            email = %user.email,
            username = %user.username,
            "New user registered"
        );

        Ok(user)
    }

    /// Replaces the user's room membership list and returns the updated profile
    #[instrument(skip(self, rooms))]
    pub async fn update_user_rooms(
        &self,
        user_id: &str,
        rooms: &[String],
    ) -> Result<UserModel, AppError> {
        self.repository.update_user_rooms(user_id, rooms).await?;

        let updated = self
            .repository
            .get_user(user_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        info!(
            user_id = %user_id,
            room_count = updated.rooms.len(),
            "User rooms updated"
        );

        Ok(updated)
    }
}
