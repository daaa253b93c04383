//! Environment-driven configuration. `.env` is honored via dotenvy in main.

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl AppConfig {
    /// Read `DATABASE_URL` (required), `BIND_ADDR` (default 127.0.0.1:3000)
    /// and `MAX_CONNECTIONS` (default 5).
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| AppError::BadRequest("DATABASE_URL is not set".into()))?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let max_connections = std::env::var("MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        Ok(AppConfig {
            database_url,
            bind_addr,
            max_connections,
        })
    }
}
