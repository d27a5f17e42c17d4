use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::RoomModel;
use crate::shared::AppError;

/// Trait for room repository operations
#[async_trait]
pub trait RoomRepository {
    async fn create_room(&self, room: &RoomModel) -> Result<(), AppError>;
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError>;

    /// Returns one room with no particular selection criteria
    ///
    /// Frontends call this to pick a default room before the user has chosen
    /// one; which room comes back is unspecified.
    async fn get_any_room(&self) -> Result<Option<RoomModel>, AppError>;

    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError>;
}

/// In-memory implementation of RoomRepository for development and testing
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<String, RoomModel>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, room))]
    async fn create_room(&self, room: &RoomModel) -> Result<(), AppError> {
        debug!(room_id = %room.id, room_name = %room.name, "Creating room in memory");

        let mut rooms = self.rooms.lock().unwrap();
        if rooms.contains_key(&room.id) {
            warn!(room_id = %room.id, "Room already exists in memory");
            return Err(AppError::DatabaseError("Room already exists".to_string()));
        }
        rooms.insert(room.id.clone(), room.clone());

        debug!(room_id = %room.id, "Room created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError> {
        debug!(room_id = %room_id, "Fetching room from memory");

        let rooms = self.rooms.lock().unwrap();
        let room = rooms.get(room_id).cloned();

        match &room {
            Some(r) => debug!(room_id = %room_id, room_name = %r.name, "Room found in memory"),
            None => debug!(room_id = %room_id, "Room not found in memory"),
        }

        Ok(room)
    }

    #[instrument(skip(self))]
    async fn get_any_room(&self) -> Result<Option<RoomModel>, AppError> {
        let rooms = self.rooms.lock().unwrap();
        let room = rooms.values().next().cloned();

        debug!(found = room.is_some(), "Fetched any room from memory");
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        debug!("Listing all rooms in memory");

        let rooms = self.rooms.lock().unwrap();
        let room_list = rooms.values().cloned().collect();

        Ok(room_list)
    }
}

/// PostgreSQL implementation of room repository
pub struct PostgresRoomRepository {
    pool: PgPool,
}

impl PostgresRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PostgresRoomRepository {
    #[instrument(skip(self, room))]
    async fn create_room(&self, room: &RoomModel) -> Result<(), AppError> {
        debug!(room_id = %room.id, room_name = %room.name, "Creating room in database");

        sqlx::query("INSERT INTO rooms (id, name) VALUES ($1, $2)")
            .bind(&room.id)
            .bind(&room.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, room_id = %room.id, "Failed to create room in database");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!(room_id = %room.id, "Room created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError> {
        let row = sqlx::query("SELECT id, name FROM rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, room_id = %room_id, "Failed to fetch room from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|row| RoomModel {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    #[instrument(skip(self))]
    async fn get_any_room(&self) -> Result<Option<RoomModel>, AppError> {
        let row = sqlx::query("SELECT id, name FROM rooms LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch any room from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|row| RoomModel {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM rooms")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list rooms from database");
                AppError::DatabaseError(e.to_string())
            })?;

        let rooms = rows
            .into_iter()
            .map(|row| RoomModel {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect();

        Ok(rooms)
    }
}
