// Public API - what other modules can use
pub use handlers::mail_chat;
pub use service::{compose_chat_digest, EmailService, HttpEmailService, NoopEmailService};
pub use types::EmailMessage;

// Internal modules
mod handlers;
mod service;
mod types;
