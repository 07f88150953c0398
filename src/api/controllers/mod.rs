//! Control-plane controllers
//!
//! Each controller receives the extracted path parameters and the parsed
//! request body, and returns a structured response or an [`ApiError`].
//! Controllers only use the hub's read operations and the scheduler's
//! trigger; connection-state mutation stays inside the WebSocket
//! lifecycle path.

pub mod channels;
pub mod events;
pub mod health;

use axum::response::{IntoResponse, Response};
use std::collections::HashMap;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::routing::Endpoint;

/// Invoke the controller behind an HTTP endpoint descriptor.
pub async fn handle(
    state: &AppState,
    endpoint: Endpoint,
    params: &HashMap<String, String>,
    body: &[u8],
) -> Response {
    let result = match endpoint {
        Endpoint::TriggerEvent => events::trigger_event(state, params, body).await,
        Endpoint::FetchChannels => channels::fetch_channels(state, params).await,
        Endpoint::FetchChannel => channels::fetch_channel(state, params).await,
        Endpoint::FetchUsers => channels::fetch_users(state, params).await,
        Endpoint::Health => health::health(state).await,
        // WebSocket descriptors never reach the controller path.
        Endpoint::EchoSocket | Endpoint::AppSocket => Err(ApiError::Internal(
            "websocket endpoint dispatched as http".to_string(),
        )),
    };

    match result {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// Fetch a required path parameter extracted by the route match.
pub(crate) fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> ApiResult<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ApiError::Internal(format!("missing route parameter: {}", name)))
}
