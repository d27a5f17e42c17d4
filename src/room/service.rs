use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::RoomModel,
    repository::RoomRepository,
    types::{RoomCreateRequest, RoomResponse},
};
use crate::shared::AppError;

/// Service for handling room business logic
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
}

impl RoomService {
    pub fn new(repository: Arc<dyn RoomRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Creates a new room with a generated id
    #[instrument(skip(self))]
    pub async fn create_room(&self, request: RoomCreateRequest) -> Result<RoomResponse, AppError> {
        let room_model = RoomModel::new(request.name);
        debug!(room_id = %room_model.id, "Generated room id");

        self.repository.create_room(&room_model).await?;

        info!(
            room_id = %room_model.id,
            room_name = %room_model.name,
            "Room created successfully"
        );

        Ok(RoomResponse {
            id: room_model.id,
            name: room_model.name,
        })
    }

    /// Gets the full room model for internal use (the upgrade endpoint's room check)
    #[instrument(skip(self))]
    pub async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError> {
        debug!(room_id = %room_id, "Getting room model");
        self.repository.get_room(room_id).await
    }

    /// Returns one room with no particular selection criteria
    #[instrument(skip(self))]
    pub async fn get_any_room(&self) -> Result<RoomResponse, AppError> {
        let room = self
            .repository
            .get_any_room()
            .await?
            .ok_or(AppError::NotFound("no rooms available".to_string()))?;

        Ok(RoomResponse {
            id: room.id,
            name: room.name,
        })
    }

    /// Lists all available rooms
    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<RoomResponse>, AppError> {
        let rooms = self.repository.list_rooms().await?;

        info!(room_count = rooms.len(), "Rooms retrieved successfully");

        Ok(rooms
            .into_iter()
            .map(|room| RoomResponse {
                id: room.id,
                name: room.name,
            })
            .collect())
    }
}
