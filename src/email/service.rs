use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::types::EmailMessage;
use crate::message::models::MessageModel;
use crate::shared::AppError;
use crate::user::models::UserModel;

/// Trait for outbound email delivery
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Delivers an email, returning a provider confirmation string
    async fn send_email(&self, email: &EmailMessage) -> Result<String, AppError>;
}

/// Email delivery over an HTTP mail API
///
/// Posts the message as JSON to the configured endpoint; the provider is
/// expected to answer 2xx on acceptance.
pub struct HttpEmailService {
    client: reqwest::Client,
    api_url: String,
}

impl HttpEmailService {
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    #[instrument(skip(self, email))]
    async fn send_email(&self, email: &EmailMessage) -> Result<String, AppError> {
        debug!(to = %email.to, subject = %email.subject, "Posting email to mail API");

        let response = self
            .client
            .post(&self.api_url)
            .json(email)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, to = %email.to, "Mail API request failed");
                AppError::EmailError(e.to_string())
            })?;

        if !response.status().is_success() {
            warn!(
                status = %response.status(),
                to = %email.to,
                "Mail API rejected email"
            );
            return Err(AppError::EmailError(format!(
                "mail API returned {}",
                response.status()
            )));
        }

        info!(to = %email.to, "Email accepted by mail API");
        Ok(format!("email sent to {}", email.to))
    }
}

/// Email service that logs instead of delivering
///
/// Used in tests and in deployments without a configured mail API.
pub struct NoopEmailService;

#[async_trait]
impl EmailService for NoopEmailService {
    async fn send_email(&self, email: &EmailMessage) -> Result<String, AppError> {
        info!(to = %email.to, subject = %email.subject, "Email delivery disabled, dropping");
        Ok(format!("email to {} dropped (mailer disabled)", email.to))
    }
}

/// Composes the plain-text chat digest mailed to a user
///
/// One section per subscribed room, messages oldest first, matching what the
/// user would see scrolling the room.
pub fn compose_chat_digest(user: &UserModel, rooms: &[(String, Vec<MessageModel>)]) -> EmailMessage {
    let mut body = format!("Hi {},\n\nhere is the latest from your rooms:\n", user.username);

    for (room_name, messages) in rooms {
        body.push_str(&format!("\n## {}\n", room_name));
        if messages.is_empty() {
            body.push_str("(no messages yet)\n");
            continue;
        }
        for message in messages {
            body.push_str(&format!(
                "[{}] {}: {}\n",
                message.timestamp.format("%Y-%m-%d %H:%M"),
                message.username,
                message.message
            ));
        }
    }

    EmailMessage {
        to: user.email.clone(),
        subject: "Your chat digest".to_string(),
        body,
    }
}
