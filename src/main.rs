//! Beacon Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Reads `./config.toml` if present. Environment variables override:
//! - `BEACON_HOST`: Host to bind to (default: 0.0.0.0)
//! - `BEACON_PORT`: Port to listen on (default: 8080)
//! - `BEACON_MAX_CONNECTIONS`: Connection limit (default: 1000)
//! - `BEACON_HEARTBEAT_ENABLED`: Periodic heartbeat broadcast (default: true)
//! - `BEACON_HEARTBEAT_INTERVAL_SECS`: Heartbeat interval (default: 1)
//! - `BEACON_LOG_LEVEL`: Log level (default: info)
//! - `BEACON_LOG_FORMAT`: `pretty` or `json` (default: pretty)
//! - `RUST_LOG`: Filter directive overriding the configured level

use std::time::Duration;

use beacon::api::{serve, AppState};
use beacon::config::Config;
use beacon::hub::HubConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration; a broken config file is fatal at startup.
    let config = Config::load_default()?;

    // Initialize tracing. RUST_LOG wins over the configured level.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "beacon={},tower_http=debug",
            config.logging.level
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Beacon server v{}", env!("CARGO_PKG_VERSION"));

    // Build the shared runtime: route table, hub, scheduler. A duplicate
    // route registration is a configuration error and fails startup.
    let state = AppState::new(HubConfig {
        max_connections: config.hub.max_connections,
    })?;

    // Periodic heartbeat to every connected client.
    if config.broadcast.heartbeat_enabled {
        state
            .scheduler
            .start_heartbeat(Duration::from_secs(config.broadcast.heartbeat_interval_secs));
    } else {
        tracing::info!("Heartbeat broadcast disabled");
    }

    tracing::info!("Starting server on {}", config.server.addr());
    serve(state, &config.server).await?;

    tracing::info!("Beacon server stopped");
    Ok(())
}
