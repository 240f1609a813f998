use anyhow::Context;
use tracing::info;

use ringline_server::config::ServerConfig;
use ringline_server::logging::{parse_log_level, setup_logging, LoggingConfig};
use ringline_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    setup_logging(LoggingConfig {
        level: parse_log_level(&config.log_level)?,
        ..LoggingConfig::default()
    });

    info!(
        "Starting ringline-server v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.bind_addr
    );

    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize application state")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    axum::serve(listener, ringline_server::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
