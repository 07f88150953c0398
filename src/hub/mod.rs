//! Connection-and-Channel Runtime
//!
//! The [`Hub`] owns the two pieces of process-wide connection state:
//!
//! - [`ConnectionRegistry`]: every live WebSocket connection, keyed by id
//! - [`ChannelManager`]: application-scoped channels and their subscribers
//!
//! It is constructed once at startup and passed explicitly to the
//! dispatcher, the message handlers, and the broadcast scheduler. Both
//! structures sit behind async `RwLock`s; lock acquisition order is
//! always registry before channels.
//!
//! The hub enforces the cross-structure invariant: a channel subscriber
//! must be a registered connection, and unregistering a connection removes
//! it from every channel it joined.

mod channels;
mod registry;

pub use channels::ChannelManager;
pub use registry::{Connection, ConnectionId, ConnectionRegistry};

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::ws::ServerMessage;

/// Configuration for the hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
        }
    }
}

/// Errors that can occur in the hub.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("too many connections (limit: {limit})")]
    TooManyConnections { limit: usize },

    #[error("connection already registered")]
    AlreadyRegistered,

    #[error("connection not found")]
    ConnectionNotFound,

    #[error("failed to send message")]
    SendFailed,
}

/// Shared connection and channel state.
pub struct Hub {
    connections: Arc<RwLock<ConnectionRegistry>>,
    channels: Arc<RwLock<ChannelManager>>,
    config: HubConfig,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: Arc::new(RwLock::new(ConnectionRegistry::new())),
            channels: Arc::new(RwLock::new(ChannelManager::new())),
            config,
        }
    }

    /// Register a new connection.
    ///
    /// Fails if the connection limit is reached or the id is already
    /// present (the lifecycle calls `on_open` exactly once per
    /// connection, so the latter indicates a handler bug).
    pub async fn register(&self, conn: Connection) -> Result<(), HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections {
                limit: self.config.max_connections,
            });
        }

        let id = conn.id.clone();
        if !connections.insert(conn) {
            return Err(HubError::AlreadyRegistered);
        }

        tracing::info!(connection_id = %id, "WebSocket connected");
        Ok(())
    }

    /// Remove a connection and its channel memberships.
    ///
    /// Idempotent: unregistering an unknown id is a no-op.
    pub async fn unregister(&self, id: &str) {
        let removed = self.connections.write().await.remove(id);

        if removed.is_some() {
            let left = self.channels.write().await.remove_connection(id);
            tracing::info!(
                connection_id = %id,
                channels_left = left,
                "WebSocket disconnected"
            );
        }
    }

    /// Subscribe a registered connection to a channel.
    pub async fn subscribe(&self, app: &str, channel: &str, id: &str) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        if !connections.contains(id) {
            return Err(HubError::ConnectionNotFound);
        }

        self.channels.write().await.subscribe(app, channel, id);
        tracing::debug!(
            connection_id = %id,
            app = %app,
            channel = %channel,
            "Subscribed to channel"
        );
        Ok(())
    }

    /// Unsubscribe a connection from a channel. Not being subscribed is
    /// not a fault.
    pub async fn unsubscribe(&self, app: &str, channel: &str, id: &str) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        if !connections.contains(id) {
            return Err(HubError::ConnectionNotFound);
        }

        self.channels.write().await.unsubscribe(app, channel, id);
        tracing::debug!(
            connection_id = %id,
            app = %app,
            channel = %channel,
            "Unsubscribed from channel"
        );
        Ok(())
    }

    /// Channel names with at least one subscriber for the app.
    pub async fn list_channels(&self, app: &str) -> Vec<String> {
        self.channels.read().await.channel_names(app)
    }

    /// Subscriber connection ids of a channel.
    pub async fn list_users(&self, app: &str, channel: &str) -> Vec<ConnectionId> {
        self.channels.read().await.subscribers(app, channel)
    }

    pub async fn subscription_count(&self, app: &str, channel: &str) -> usize {
        self.channels.read().await.subscriber_count(app, channel)
    }

    /// Send a message directly to one connection.
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let conn = connections.get(id).ok_or(HubError::ConnectionNotFound)?;
        conn.sender.send(message).map_err(|_| HubError::SendFailed)
    }

    /// Send a payload to every registered connection.
    ///
    /// Returns the number of send attempts. Best-effort: a connection
    /// whose queue is gone is torn down, and delivery to the remaining
    /// connections proceeds.
    pub async fn broadcast_all(&self, message: ServerMessage) -> usize {
        let (attempts, failed) = {
            let connections = self.connections.read().await;
            let mut failed = Vec::new();
            let mut attempts = 0;

            for conn in connections.iter() {
                attempts += 1;
                if conn.sender.send(message.clone()).is_err() {
                    failed.push(conn.id.clone());
                }
            }
            (attempts, failed)
        };

        self.reap(failed).await;
        attempts
    }

    /// Send a payload to every current subscriber of a channel.
    ///
    /// Returns the number of send attempts.
    pub async fn broadcast_channel(&self, app: &str, channel: &str, message: ServerMessage) -> usize {
        let subscriber_ids = self.channels.read().await.subscribers(app, channel);

        let (attempts, failed) = {
            let connections = self.connections.read().await;
            let mut failed = Vec::new();
            let mut attempts = 0;

            for id in &subscriber_ids {
                if let Some(conn) = connections.get(id) {
                    attempts += 1;
                    if conn.sender.send(message.clone()).is_err() {
                        failed.push(conn.id.clone());
                    }
                }
            }
            (attempts, failed)
        };

        self.reap(failed).await;
        attempts
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.connections.read().await.contains(id)
    }

    /// Tear down connections whose outbound queue is gone. Same cleanup
    /// as the lifecycle's error path, scoped to each failed connection.
    async fn reap(&self, failed: Vec<ConnectionId>) {
        for id in failed {
            tracing::warn!(connection_id = %id, "Send failed, tearing down connection");
            self.unregister(&id).await;
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn open_conn(app: &str) -> (Connection, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Connection::new(Some(app.to_string()), tx), rx)
    }

    fn heartbeat() -> ServerMessage {
        ServerMessage::Heartbeat {
            time: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = Hub::default();
        let (conn, _rx) = open_conn("app1");
        let id = conn.id.clone();

        hub.register(conn).await.unwrap();
        assert_eq!(hub.connection_count().await, 1);
        assert!(hub.contains(&id).await);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);

        // Second unregister is a no-op.
        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_twice_fails() {
        let hub = Hub::default();
        let (conn, _rx) = open_conn("app1");
        let dup = conn.clone();

        hub.register(conn).await.unwrap();
        let err = hub.register(dup).await.unwrap_err();
        assert!(matches!(err, HubError::AlreadyRegistered));
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = Hub::new(HubConfig { max_connections: 1 });
        let (first, _rx1) = open_conn("app1");
        let (second, _rx2) = open_conn("app1");

        hub.register(first).await.unwrap();
        let err = hub.register(second).await.unwrap_err();
        assert!(matches!(err, HubError::TooManyConnections { limit: 1 }));
    }

    #[tokio::test]
    async fn test_subscribe_requires_registered_connection() {
        let hub = Hub::default();

        let err = hub.subscribe("app1", "general", "ghost").await.unwrap_err();
        assert!(matches!(err, HubError::ConnectionNotFound));
        assert!(hub.list_channels("app1").await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_clears_channel_memberships() {
        let hub = Hub::default();
        let (conn, _rx) = open_conn("app1");
        let id = conn.id.clone();
        hub.register(conn).await.unwrap();

        hub.subscribe("app1", "general", &id).await.unwrap();
        assert_eq!(hub.list_users("app1", "general").await, vec![id.clone()]);

        hub.unregister(&id).await;
        assert!(hub.list_users("app1", "general").await.is_empty());
        assert!(hub.list_channels("app1").await.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_all_reaches_every_connection() {
        let hub = Hub::default();
        let (a, mut rx_a) = open_conn("app1");
        let (b, mut rx_b) = open_conn("app1");
        let (c, mut rx_c) = open_conn("app2");
        hub.register(a).await.unwrap();
        hub.register(b).await.unwrap();
        hub.register(c).await.unwrap();

        let attempts = hub.broadcast_all(heartbeat()).await;
        assert_eq!(attempts, 3);

        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            match rx.try_recv().unwrap() {
                ServerMessage::Heartbeat { time } => {
                    assert_eq!(time, "2024-01-01 00:00:00");
                }
                other => panic!("unexpected message: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_broadcast_failure_does_not_abort_fanout() {
        let hub = Hub::default();
        let (a, rx_a) = open_conn("app1");
        let (b, mut rx_b) = open_conn("app1");
        let dead_id = a.id.clone();
        hub.register(a).await.unwrap();
        hub.register(b).await.unwrap();

        // Dropping the receiver makes every send to this connection fail.
        drop(rx_a);

        let attempts = hub.broadcast_all(heartbeat()).await;
        assert_eq!(attempts, 2);
        assert!(rx_b.try_recv().is_ok());

        // The dead connection was torn down; the next tick reaches one.
        assert!(!hub.contains(&dead_id).await);
        assert_eq!(hub.broadcast_all(heartbeat()).await, 1);
    }

    #[tokio::test]
    async fn test_broadcast_channel_only_reaches_subscribers() {
        let hub = Hub::default();
        let (a, mut rx_a) = open_conn("app1");
        let (b, mut rx_b) = open_conn("app1");
        let id_a = a.id.clone();
        hub.register(a).await.unwrap();
        hub.register(b).await.unwrap();

        hub.subscribe("app1", "general", &id_a).await.unwrap();

        let attempts = hub.broadcast_channel("app1", "general", heartbeat()).await;
        assert_eq!(attempts, 1);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_unknown_channel_is_empty() {
        let hub = Hub::default();
        assert_eq!(
            hub.broadcast_channel("app1", "doesnotexist", heartbeat()).await,
            0
        );
    }

    #[tokio::test]
    async fn test_closed_subscriber_leaves_empty_user_list() {
        let hub = Hub::default();
        let (a, _rx) = open_conn("app1");
        let id = a.id.clone();
        hub.register(a).await.unwrap();
        hub.subscribe("app1", "general", &id).await.unwrap();

        hub.unregister(&id).await;
        assert!(hub.list_users("app1", "general").await.is_empty());
    }

    #[tokio::test]
    async fn test_send_to_unknown_connection() {
        let hub = Hub::default();
        let err = hub.send_to("ghost", heartbeat()).await.unwrap_err();
        assert!(matches!(err, HubError::ConnectionNotFound));
    }
}
