use std::env;

/// Application configuration resolved from environment variables
///
/// Production deployments set these on the environment; development falls
/// back to in-memory storage and a disabled mailer when the optional
/// variables are absent.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds to
    pub port: u16,
    /// Postgres connection string; in-memory repositories are used when unset
    pub database_url: Option<String>,
    /// Mail delivery API endpoint; email notifications are disabled when unset
    pub mail_api_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            port,
            database_url: env::var("DATABASE_URL").ok(),
            mail_api_url: env::var("MAIL_API_URL").ok(),
        }
    }
}
