// Public API - what other modules can use
pub use handlers::get_messages;
pub use service::MessageService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
