//! WebSocket Message Types
//!
//! Tagged JSON envelopes exchanged between clients and the beacon server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a channel within the connection's application scope
    Subscribe {
        /// Channel name (e.g. "general")
        channel: String,
    },
    /// Leave a channel
    Unsubscribe {
        /// Channel name
        channel: String,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// Subscription confirmed
    Subscribed {
        /// Channel joined
        channel: String,
    },
    /// Unsubscription confirmed
    Unsubscribed {
        /// Channel left
        channel: String,
    },
    /// A triggered event, fanned out to a channel's subscribers
    Event {
        /// Channel the event was published to
        channel: String,
        /// Event name
        event: String,
        /// Publisher-supplied payload
        data: Value,
    },
    /// Periodic heartbeat
    Heartbeat {
        /// Wall-clock time, `YYYY-MM-DD HH:MM:SS`
        time: String,
    },
    /// Echo of a client frame (echo endpoint)
    Echo {
        /// The received payload, verbatim
        payload: String,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl ServerMessage {
    /// Heartbeat carrying the current local wall-clock time.
    pub fn heartbeat_now() -> Self {
        Self::Heartbeat {
            time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialize_subscribe() {
        let json = r#"{"type": "subscribe", "channel": "general"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Subscribe { channel } => assert_eq!(channel, "general"),
            _ => panic!("Expected Subscribe"),
        }
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_client_message_rejects_unknown_type() {
        let json = r#"{"type": "publish", "channel": "general"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize_event() {
        let msg = ServerMessage::Event {
            channel: "general".to_string(),
            event: "order-created".to_string(),
            data: serde_json::json!({"id": 42}),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"event\""));
        assert!(json.contains("\"channel\":\"general\""));
        assert!(json.contains("\"event\":\"order-created\""));
        assert!(json.contains("\"id\":42"));
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }

    #[test]
    fn test_heartbeat_format() {
        let msg = ServerMessage::heartbeat_now();
        match msg {
            ServerMessage::Heartbeat { time } => {
                // "YYYY-MM-DD HH:MM:SS"
                assert_eq!(time.len(), 19);
                assert_eq!(&time[4..5], "-");
                assert_eq!(&time[10..11], " ");
                assert_eq!(&time[13..14], ":");
            }
            _ => panic!("Expected Heartbeat"),
        }
    }
}
