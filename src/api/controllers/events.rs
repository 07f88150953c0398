//! Event Trigger Controller
//!
//! - POST /apps/{appId}/events - publish an event to channels

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;

use crate::api::dto::{TriggerEventRequest, TriggerEventResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::ws::ServerMessage;

use super::param;

/// POST /apps/{appId}/events
///
/// Fan an event out to the current subscribers of the named channels.
/// Fire-and-forget: the response reports delivery attempts, not
/// acknowledgments.
pub async fn trigger_event(
    state: &AppState,
    params: &HashMap<String, String>,
    body: &[u8],
) -> ApiResult<Response> {
    let app_id = param(params, "appId")?;

    let req: TriggerEventRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?;

    validate_request(&req)?;

    let targets = req.target_channels();
    let mut delivered = 0;
    for channel in &targets {
        let message = ServerMessage::Event {
            channel: channel.clone(),
            event: req.name.clone(),
            data: req.data.clone(),
        };
        delivered += state
            .scheduler
            .broadcast_to_channel(app_id, channel, message)
            .await;
    }

    tracing::info!(
        app_id = %app_id,
        event = %req.name,
        channels = targets.len(),
        delivered = delivered,
        "Triggered event"
    );

    Ok((
        StatusCode::OK,
        Json(TriggerEventResponse {
            channels: targets.len(),
            delivered,
        }),
    )
        .into_response())
}

/// Validate a trigger request
fn validate_request(req: &TriggerEventRequest) -> ApiResult<()> {
    if req.name.is_empty() {
        return Err(ApiError::Validation(
            "Event name cannot be empty".to_string(),
        ));
    }

    if req.name.len() > 200 {
        return Err(ApiError::Validation(
            "Event name exceeds maximum length of 200 characters".to_string(),
        ));
    }

    if req.target_channels().is_empty() {
        return Err(ApiError::Validation(
            "Event must name at least one channel".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> TriggerEventRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_validate_accepts_single_channel() {
        let req = request(r#"{"name": "ping", "channel": "general"}"#);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let req = request(r#"{"name": "", "channel": "general"}"#);
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_channels() {
        let req = request(r#"{"name": "ping"}"#);
        assert!(validate_request(&req).is_err());
    }
}
