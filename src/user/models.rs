use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the users table
///
/// `rooms` holds the ids of the rooms the user has added to their sidebar;
/// it is unrelated to live hub membership, which is bound per connection.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserModel {
    pub id: String,
    pub email: String,
    pub username: String,
    pub user_image: String,
    pub rooms: Vec<String>,
}

impl UserModel {
    /// Creates a new user profile from login data
    ///
    /// The username is derived from the email local part; there is no
    /// separate registration step.
    pub fn from_auth(email: String, user_image: String) -> Self {
        let username = email
            .split('@')
            .next()
            .unwrap_or(email.as_str())
            .to_string();

        Self {
            id: Uuid::new_v4().to_string(),
            email,
            username,
            user_image,
            rooms: Vec::new(),
        }
    }
}
