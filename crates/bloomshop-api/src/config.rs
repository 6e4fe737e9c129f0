//! Environment-based service configuration.

use crate::error::AppError;

/// Settings read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string. Required.
    pub database_url: String,
    /// Comma-separated broker addresses.
    pub kafka_bootstrap_servers: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl AppConfig {
    /// Reads the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `DATABASE_URL` is absent or `PORT`
    /// does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL environment variable must be set".into()))?;
        let kafka_bootstrap_servers =
            std::env::var("KAFKA_BOOTSTRAP_SERVERS").unwrap_or_else(|_| "localhost:9092".into());
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .map_err(|err| AppError::Config(format!("PORT must be a valid u16: {err}")))?;

        Ok(Self {
            database_url,
            kafka_bootstrap_servers,
            host,
            port,
        })
    }
}
