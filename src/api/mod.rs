//! Beacon HTTP Surface
//!
//! One listening port serves both the WebSocket endpoints and the REST
//! control plane, built with Axum.
//!
//! # Endpoints
//!
//! ## WebSocket
//! - `GET /` - echo/heartbeat connection
//! - `GET /app/{appKey}` - application-scoped channel connection
//!
//! ## Control plane
//! - `POST /apps/{appId}/events` - trigger an event on channels
//! - `GET /apps/{appId}/channels` - list occupied channels
//! - `GET /apps/{appId}/channels/{channelName}` - channel state
//! - `GET /apps/{appId}/channels/{channelName}/users` - subscribed users
//!
//! ## Health
//! - `GET /health` - liveness and connection count
//!
//! Every request flows through the [`dispatch`] fallback handler, which
//! consults the route table to classify it as HTTP or WebSocket upgrade.

pub mod controllers;
pub mod dispatch;
pub mod dto;
pub mod error;
pub mod state;

pub use dispatch::dispatch;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;

/// Build the router: a fallback-only dispatcher plus middleware, so the
/// route table stays the single source of routing truth.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Beacon listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Beacon shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
