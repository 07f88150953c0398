//! # Beacon
//!
//! Pusher-style real-time broadcast server: WebSocket channels and an
//! HTTP control plane on a single listening port.
//!
//! ## Features
//!
//! - **Single endpoint**: one port classifies each connection as HTTP or
//!   WebSocket upgrade and dispatches it through a route table
//! - **Channels**: application-scoped channel subscriptions with
//!   best-effort fan-out
//! - **Control plane**: trigger events and inspect channels over REST
//! - **Heartbeat**: periodic broadcast to every connected client
//!
//! ## Modules
//!
//! - [`routing`]: route table and URI-template matching
//! - [`hub`]: connection registry and channel manager
//! - [`ws`]: WebSocket lifecycle contract and endpoint handlers
//! - [`broadcast`]: heartbeat scheduler and channel-scoped triggers
//! - [`api`]: dispatcher, controllers, and server wiring
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beacon::api::{serve, AppState};
//! use beacon::config::Config;
//! use beacon::hub::HubConfig;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!
//!     let state = AppState::new(HubConfig {
//!         max_connections: config.hub.max_connections,
//!     })?;
//!
//!     // Push a timestamp to every connection each second.
//!     state.scheduler.start_heartbeat(Duration::from_secs(1));
//!
//!     serve(state, &config.server).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod broadcast;
pub mod config;
pub mod hub;
pub mod routing;
pub mod ws;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, ApiResult, AppState};

pub use broadcast::BroadcastScheduler;

pub use config::{Config, ConfigError, LoggingConfig, ServerConfig};

pub use hub::{ChannelManager, Connection, ConnectionId, ConnectionRegistry, Hub, HubConfig, HubError};

pub use routing::{Endpoint, Route, RouteError, RouteKind, RouteMatch, RouteTable};

pub use ws::{
    serve_socket, ChannelHandler, ClientMessage, EchoHandler, MessageHandler, ServerMessage,
};
