use serde::{Deserialize, Serialize};

/// An outbound email, as posted to the mail delivery API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}
