//! Health Controller
//!
//! - GET /health - liveness and connection count

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::api::dto::HealthResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /health
pub async fn health(state: &AppState) -> ApiResult<Response> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        connections: state.hub.connection_count().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
    .into_response())
}
