// Library crate for the chat relay server
// This file exposes the public API for integration tests

pub mod config;
pub mod email;
pub mod hub;
pub mod message;
pub mod room;
pub mod shared;
pub mod user;
pub mod ws;

// Re-export commonly used types for easier access in tests
pub use hub::{ClientHandle, ClientId, ClientState, Hub, HubHandle, OUTBOUND_QUEUE_CAPACITY};
pub use message::models::{ChatMessage, MessageModel};
pub use message::MessageService;
pub use shared::{AppError, AppState};
pub use ws::{parse_frame, FrameError};
