use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::message::models::ChatMessage;

/// Error for an inbound frame the relay refuses to process
///
/// Any variant is a protocol error: the connection is terminated without
/// partially processing the frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed chat frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("frame addressed to room {got} on a connection bound to {bound}")]
    RoomMismatch { got: String, bound: String },
}

/// Wire shape of an inbound chat frame
///
/// `room_id` and `timestamp` are optional on the wire: the connection is
/// bound to one room at upgrade time and the server stamps receipt time for
/// senders that omit one.
#[derive(Debug, Deserialize)]
struct InboundFrame {
    message: String,
    user_id: String,
    username: String,
    #[serde(default)]
    user_image: String,
    #[serde(default)]
    room_id: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Decodes an inbound text frame into the message the hub relays
///
/// A frame naming a room other than the one this connection joined is
/// rejected; accepting it would let one connection inject messages into
/// rooms it never registered with.
pub fn parse_frame(text: &str, bound_room: &str) -> Result<ChatMessage, FrameError> {
    let frame: InboundFrame = serde_json::from_str(text)?;

    if !frame.room_id.is_empty() && frame.room_id != bound_room {
        return Err(FrameError::RoomMismatch {
            got: frame.room_id,
            bound: bound_room.to_string(),
        });
    }

    Ok(ChatMessage {
        message: frame.message,
        user_id: frame.user_id,
        username: frame.username,
        user_image: frame.user_image,
        room_id: bound_room.to_string(),
        timestamp: frame.timestamp.unwrap_or_else(Utc::now),
    })
}
