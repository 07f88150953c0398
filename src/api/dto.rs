//! Data Transfer Objects
//!
//! Request and response types for the control-plane endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for POST /apps/{appId}/events
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerEventRequest {
    /// Event name
    pub name: String,
    /// Single target channel
    #[serde(default)]
    pub channel: Option<String>,
    /// Multiple target channels
    #[serde(default)]
    pub channels: Option<Vec<String>>,
    /// Publisher-supplied payload, forwarded verbatim
    #[serde(default)]
    pub data: Value,
}

impl TriggerEventRequest {
    /// Target channels, from either form of the request.
    pub fn target_channels(&self) -> Vec<String> {
        let mut targets = self.channels.clone().unwrap_or_default();
        if let Some(channel) = &self.channel {
            targets.push(channel.clone());
        }
        targets
    }
}

/// Response body for POST /apps/{appId}/events
#[derive(Debug, Serialize)]
pub struct TriggerEventResponse {
    /// Number of channels the event was published to
    pub channels: usize,
    /// Number of delivery attempts across those channels
    pub delivered: usize,
}

/// One occupied channel
#[derive(Debug, Serialize)]
pub struct ChannelInfo {
    pub name: String,
    pub subscription_count: usize,
}

/// Response body for GET /apps/{appId}/channels
#[derive(Debug, Serialize)]
pub struct ChannelListResponse {
    pub total: usize,
    pub channels: Vec<ChannelInfo>,
}

/// Response body for GET /apps/{appId}/channels/{channelName}
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub channel: String,
    pub occupied: bool,
    pub subscription_count: usize,
}

/// One subscribed user (a user is a subscribed connection id)
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
}

/// Response body for GET /apps/{appId}/channels/{channelName}/users
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub total: usize,
    pub users: Vec<UserInfo>,
}

/// Response body for GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_event_single_channel() {
        let req: TriggerEventRequest = serde_json::from_str(
            r#"{"name": "order-created", "channel": "orders", "data": {"id": 1}}"#,
        )
        .unwrap();

        assert_eq!(req.name, "order-created");
        assert_eq!(req.target_channels(), vec!["orders"]);
        assert_eq!(req.data["id"], 1);
    }

    #[test]
    fn test_trigger_event_multiple_channels() {
        let req: TriggerEventRequest = serde_json::from_str(
            r#"{"name": "ping", "channels": ["a", "b"]}"#,
        )
        .unwrap();

        assert_eq!(req.target_channels(), vec!["a", "b"]);
        assert!(req.data.is_null());
    }

    #[test]
    fn test_trigger_event_no_channel() {
        let req: TriggerEventRequest =
            serde_json::from_str(r#"{"name": "ping"}"#).unwrap();
        assert!(req.target_channels().is_empty());
    }

    #[test]
    fn test_channel_response_serializes() {
        let resp = ChannelResponse {
            channel: "general".to_string(),
            occupied: false,
            subscription_count: 0,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"occupied\":false"));
        assert!(json.contains("\"subscription_count\":0"));
    }
}
