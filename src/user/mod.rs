// Public API - what other modules can use
pub use handlers::{auth_user, get_user_by_email, update_user_rooms};
pub use service::UserService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
