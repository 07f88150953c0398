//! Dispatcher
//!
//! Single entry point for every inbound request. The axum router carries
//! no routes of its own; this fallback handler matches method + path
//! against the [`RouteTable`] and either completes a WebSocket upgrade,
//! invokes a controller, or refuses the request.
//!
//! The dispatcher never mutates the connection registry: registration and
//! removal happen only inside the handler lifecycle callbacks.

use axum::{
    extract::{Request, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::controllers;
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::routing::{RouteKind, RouteMatch};
use crate::ws::serve_socket;

/// Maximum accepted control-plane request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Route an inbound request to its WebSocket handler or controller.
pub async fn dispatch(
    State(state): State<AppState>,
    ws: Option<WebSocketUpgrade>,
    req: Request,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let Some(matched) = state.routes.match_route(&method, &path) else {
        return ApiError::NotFound(format!("{} {}", method, path)).into_response();
    };

    match matched.kind {
        RouteKind::WebSocket => upgrade(state, matched, ws),
        RouteKind::Http => {
            let body = match axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    return ApiError::Validation(format!("Failed to read request body: {}", e))
                        .into_response()
                }
            };

            controllers::handle(&state, matched.endpoint, &matched.params, &body).await
        }
    }
}

/// Complete the upgrade handshake and hand the socket to the route's
/// handler instance. A request without upgrade negotiation is refused
/// before any lifecycle callback fires.
fn upgrade(state: AppState, matched: RouteMatch, ws: Option<WebSocketUpgrade>) -> Response {
    let Some(ws) = ws else {
        return ApiError::UpgradeRequired(
            "this endpoint only accepts WebSocket connections".to_string(),
        )
        .into_response();
    };

    let Some(handler) = state.socket_handler(matched.endpoint) else {
        return ApiError::Internal("no handler for websocket endpoint".to_string())
            .into_response();
    };

    let app = matched.params.get("appKey").cloned();
    let hub = Arc::clone(&state.hub);

    ws.on_upgrade(move |socket| serve_socket(socket, hub, handler, app))
}
