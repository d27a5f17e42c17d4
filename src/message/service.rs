use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::{ChatMessage, MessageModel},
    repository::MessageRepository,
};
use crate::shared::AppError;

/// Service for handling message persistence and history
///
/// `store_message` is the durability half of the relay's delivery/durability
/// split: the hub never waits on it, callers invoke it independently of
/// broadcast and only report failures.
pub struct MessageService {
    repository: Arc<dyn MessageRepository + Send + Sync>,
}

impl MessageService {
    pub fn new(repository: Arc<dyn MessageRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Persists a relayed message, returning the stored message id
    #[instrument(skip(self, message))]
    pub async fn store_message(&self, message: &ChatMessage) -> Result<String, AppError> {
        let message_id = self.repository.add_message(message).await?;

        debug!(
            message_id = %message_id,
            room_id = %message.room_id,
            user_id = %message.user_id,
            "Message stored"
        );

        Ok(message_id)
    }

    /// Returns a room's message history, oldest first
    #[instrument(skip(self))]
    pub async fn room_history(&self, room_id: &str) -> Result<Vec<MessageModel>, AppError> {
        let history = self.repository.messages_for_room(room_id).await?;

        info!(
            room_id = %room_id,
            message_count = history.len(),
            "Room history retrieved"
        );

        Ok(history)
    }
}
