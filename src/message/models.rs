use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A chat message relayed between room members
///
/// Immutable once constructed. The same shape travels from the read pump
/// through the hub to every other member's write pump, and independently to
/// the message store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    pub user_id: String,
    pub username: String,
    pub user_image: String,
    pub room_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Database model for the messages table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MessageModel {
    pub id: String,
    pub message: String,
    pub room_id: String,
    pub user_id: String,
    pub username: String,
    pub user_image: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageModel {
    /// Builds the persisted form of a relayed chat message
    pub fn from_chat(id: String, chat: &ChatMessage) -> Self {
        Self {
            id,
            message: chat.message.clone(),
            room_id: chat.room_id.clone(),
            user_id: chat.user_id.clone(),
            username: chat.username.clone(),
            user_image: chat.user_image.clone(),
            timestamp: chat.timestamp,
        }
    }
}
