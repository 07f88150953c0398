//! Connection registry
//!
//! Plain map of connection id → connection handle. A connection is present
//! exactly while its lifecycle is open: inserted by `on_open`, removed by
//! `on_close`/`on_error` (or by a failed send during fan-out). Removal is
//! idempotent.

use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::ws::ServerMessage;

/// Unique identifier for a WebSocket connection, assigned on accept.
pub type ConnectionId = String;

/// Handle to a live WebSocket connection.
///
/// The sender queues outbound messages for the connection's forwarding
/// task; messages reach the transport in the order they were queued.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    /// Application scope from the connect URI, if the route carries one.
    pub app: Option<String>,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(app: Option<String>, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            app,
            sender,
        }
    }
}

/// Mapping from connection id to live connection.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Insert a connection. Returns false if the id is already present.
    pub fn insert(&mut self, conn: Connection) -> bool {
        if self.connections.contains_key(&conn.id) {
            return false;
        }
        self.connections.insert(conn.id.clone(), conn);
        true
    }

    /// Remove a connection. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Iterate over every live connection.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> (Connection, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Connection::new(Some("app1".to_string()), tx), rx)
    }

    #[test]
    fn test_insert_and_remove() {
        let mut registry = ConnectionRegistry::new();
        let (conn, _rx) = connection();
        let id = conn.id.clone();

        assert!(registry.insert(conn));
        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(&id).is_some());
        assert!(!registry.contains(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = ConnectionRegistry::new();
        let (conn, _rx) = connection();
        let id = conn.id.clone();

        registry.insert(conn);
        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.remove("never-registered").is_none());
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut registry = ConnectionRegistry::new();
        let (conn, _rx) = connection();
        let dup = conn.clone();

        assert!(registry.insert(conn));
        assert!(!registry.insert(dup));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let (a, _rx1) = connection();
        let (b, _rx2) = connection();
        assert_ne!(a.id, b.id);
    }
}
