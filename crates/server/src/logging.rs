//! Logging setup

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The log level to use
    pub level: Level,
    /// Whether to enable JSON formatting
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Level::INFO,
            json: false,
        }
    }
}

/// Set up the logging system with the provided configuration
pub fn setup_logging(config: LoggingConfig) {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let subscriber = fmt::Subscriber::builder().with_env_filter(filter);
    if config.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    Level::from_str(level).map_err(|_| anyhow::anyhow!("Invalid log level: {}", level))
}
