use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{ChatMessage, MessageModel};
use crate::shared::AppError;

/// Trait for message repository operations
#[async_trait]
pub trait MessageRepository {
    /// Persists a relayed message and returns its generated id
    async fn add_message(&self, message: &ChatMessage) -> Result<String, AppError>;

    /// Returns a room's history ordered by timestamp ascending
    async fn messages_for_room(&self, room_id: &str) -> Result<Vec<MessageModel>, AppError>;
}

/// In-memory implementation of MessageRepository for development and testing
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<MessageModel>>,
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current number of stored messages
    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    #[instrument(skip(self, message))]
    async fn add_message(&self, message: &ChatMessage) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        debug!(message_id = %id, room_id = %message.room_id, "Storing message in memory");

        let model = MessageModel::from_chat(id.clone(), message);
        self.messages.lock().unwrap().push(model);

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn messages_for_room(&self, room_id: &str) -> Result<Vec<MessageModel>, AppError> {
        debug!(room_id = %room_id, "Fetching room history from memory");

        let messages = self.messages.lock().unwrap();
        let mut history: Vec<MessageModel> = messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();
        history.sort_by_key(|m| m.timestamp);

        debug!(room_id = %room_id, count = history.len(), "Room history fetched from memory");
        Ok(history)
    }
}

/// PostgreSQL implementation of message repository
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    #[instrument(skip(self, message))]
    async fn add_message(&self, message: &ChatMessage) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        debug!(message_id = %id, room_id = %message.room_id, "Storing message in database");

        sqlx::query(
            "INSERT INTO messages (id, message, room_id, user_id, username, user_image, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&id)
        .bind(&message.message)
        .bind(&message.room_id)
        .bind(&message.user_id)
        .bind(&message.username)
        .bind(&message.user_image)
        .bind(message.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, room_id = %message.room_id, "Failed to store message in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(message_id = %id, "Message stored successfully in database");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn messages_for_room(&self, room_id: &str) -> Result<Vec<MessageModel>, AppError> {
        debug!(room_id = %room_id, "Fetching room history from database");

        let rows = sqlx::query(
            "SELECT id, message, room_id, user_id, username, user_image, timestamp \
             FROM messages WHERE room_id = $1 ORDER BY timestamp ASC",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, room_id = %room_id, "Failed to fetch room history from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let history = rows
            .into_iter()
            .map(|row| MessageModel {
                id: row.get("id"),
                message: row.get("message"),
                room_id: row.get("room_id"),
                user_id: row.get("user_id"),
                username: row.get("username"),
                user_image: row.get("user_image"),
                timestamp: row.get("timestamp"),
            })
            .collect();

        Ok(history)
    }
}
