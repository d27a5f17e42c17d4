// Public API - what other modules can use
pub use handlers::{create_room, get_any_room, list_rooms};
pub use service::RoomService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
