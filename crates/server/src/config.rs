//! Configuration for the server binary

use std::net::SocketAddr;

/// Main configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// HS256 signing secret for access tokens.
    pub secret_key: String,
    pub log_level: String,
}

impl ServerConfig {
    /// Load configuration from the environment, falling back to the
    /// defaults below for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = addr.parse()?;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            config.secret_key = secret;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".parse().unwrap(),
            database_url: "sqlite://ringline.db?mode=rwc".to_string(),
            secret_key: "your-secret-key-change-in-production".to_string(),
            log_level: "info".to_string(),
        }
    }
}
