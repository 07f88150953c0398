//! WebSocket connection lifecycle
//!
//! [`MessageHandler`] is the lifecycle contract for a WebSocket endpoint:
//! `on_open` / `on_message` / `on_close` / `on_error`. One handler
//! instance serves every connection of its route, so handlers hold no
//! per-connection state; everything connection-scoped lives in the hub,
//! keyed by connection id.
//!
//! Per connection the lifecycle is `Unopened -> Open -> {Closed, Errored}`.
//! `on_open` runs exactly once, no frame is dispatched after a terminal
//! callback, and both terminal paths converge on the shared [`teardown`]
//! helper.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::messages::{ClientMessage, ServerMessage};
use crate::hub::{Connection, Hub, HubError};

/// Lifecycle contract for a WebSocket endpoint.
///
/// `on_message` is the only required method; the defaults register on
/// open and run the shared cleanup on close and error. Implementations
/// that override a terminal callback should still call [`teardown`].
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Called once when the upgrade completes. The default registers the
    /// connection in the hub and may refuse it (connection limit).
    async fn on_open(&self, hub: &Hub, conn: &Connection) -> Result<(), HubError> {
        hub.register(conn.clone()).await
    }

    /// Called for every text frame received while the connection is open.
    async fn on_message(&self, hub: &Hub, conn: &Connection, payload: &str);

    /// Called once when the connection closes cleanly. Idempotent.
    async fn on_close(&self, hub: &Hub, conn: &Connection) {
        teardown(hub, conn).await;
    }

    /// Called once on a transport fault. The fault is scoped to this
    /// connection and never propagates further.
    async fn on_error(&self, hub: &Hub, conn: &Connection, error: &axum::Error) {
        tracing::error!(connection_id = %conn.id, error = %error, "WebSocket error");
        teardown(hub, conn).await;
    }
}

/// Shared terminal-state cleanup: remove the connection from the registry
/// and from every channel it joined. Safe to call more than once.
pub async fn teardown(hub: &Hub, conn: &Connection) {
    hub.unregister(&conn.id).await;
}

/// Echo endpoint handler: logs each frame and sends it straight back.
#[derive(Debug, Default)]
pub struct EchoHandler;

#[async_trait]
impl MessageHandler for EchoHandler {
    async fn on_message(&self, hub: &Hub, conn: &Connection, payload: &str) {
        tracing::info!(connection_id = %conn.id, payload = %payload, "Received frame");
        let _ = hub
            .send_to(
                &conn.id,
                ServerMessage::Echo {
                    payload: payload.to_string(),
                },
            )
            .await;
    }
}

/// Application endpoint handler: interprets the subscribe/unsubscribe
/// envelope and drives channel membership for the connection's app scope.
#[derive(Debug, Default)]
pub struct ChannelHandler;

impl ChannelHandler {
    async fn reply(&self, hub: &Hub, conn: &Connection, message: ServerMessage) {
        let _ = hub.send_to(&conn.id, message).await;
    }

    async fn handle_envelope(&self, hub: &Hub, conn: &Connection, message: ClientMessage) {
        let Some(app) = conn.app.as_deref() else {
            self.reply(
                hub,
                conn,
                ServerMessage::Error {
                    message: "connection has no application scope".to_string(),
                },
            )
            .await;
            return;
        };

        match message {
            ClientMessage::Subscribe { channel } => {
                match hub.subscribe(app, &channel, &conn.id).await {
                    Ok(()) => {
                        self.reply(hub, conn, ServerMessage::Subscribed { channel }).await;
                    }
                    Err(e) => {
                        tracing::error!(
                            connection_id = %conn.id,
                            channel = %channel,
                            error = %e,
                            "Subscribe error"
                        );
                        self.reply(
                            hub,
                            conn,
                            ServerMessage::Error {
                                message: e.to_string(),
                            },
                        )
                        .await;
                    }
                }
            }
            ClientMessage::Unsubscribe { channel } => {
                match hub.unsubscribe(app, &channel, &conn.id).await {
                    Ok(()) => {
                        self.reply(hub, conn, ServerMessage::Unsubscribed { channel }).await;
                    }
                    Err(e) => {
                        self.reply(
                            hub,
                            conn,
                            ServerMessage::Error {
                                message: e.to_string(),
                            },
                        )
                        .await;
                    }
                }
            }
            ClientMessage::Ping => {
                self.reply(hub, conn, ServerMessage::Pong).await;
            }
        }
    }
}

#[async_trait]
impl MessageHandler for ChannelHandler {
    async fn on_message(&self, hub: &Hub, conn: &Connection, payload: &str) {
        match serde_json::from_str::<ClientMessage>(payload) {
            Ok(message) => self.handle_envelope(hub, conn, message).await,
            Err(e) => {
                tracing::debug!(
                    connection_id = %conn.id,
                    error = %e,
                    payload = %payload,
                    "Invalid client message"
                );
                // Malformed input gets an error reply; the connection stays open.
                self.reply(
                    hub,
                    conn,
                    ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    },
                )
                .await;
            }
        }
    }
}

/// Serve an upgraded WebSocket until it closes or faults.
///
/// Outbound messages flow through a per-connection queue and a forwarding
/// task, so they reach the transport in the order they were queued.
pub async fn serve_socket(
    socket: WebSocket,
    hub: Arc<Hub>,
    handler: Arc<dyn MessageHandler>,
    app: Option<String>,
) {
    let (mut sink, mut stream) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let conn = Connection::new(app, tx);

    if let Err(e) = handler.on_open(&hub, &conn).await {
        tracing::error!(error = %e, "Refused WebSocket connection");
        if let Ok(text) = serde_json::to_string(&ServerMessage::Error {
            message: e.to_string(),
        }) {
            let _ = sink.send(Message::Text(text)).await;
        }
        return;
    }

    if hub
        .send_to(
            &conn.id,
            ServerMessage::Connected {
                connection_id: conn.id.clone(),
            },
        )
        .await
        .is_err()
    {
        handler.on_close(&hub, &conn).await;
        return;
    }

    let send_conn_id = conn.id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            connection_id = %send_conn_id,
                            "WebSocket send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize message");
                }
            }
        }
    });

    let recv_hub = Arc::clone(&hub);
    let recv_handler = Arc::clone(&handler);
    let recv_conn = conn.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(frame) => {
                    if !handle_frame(&recv_hub, recv_handler.as_ref(), &recv_conn, frame).await {
                        return Ok(());
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    });

    // Whichever side finishes first decides the terminal callback; the
    // other task is aborted so no frame is dispatched after it.
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            handler.on_close(&hub, &conn).await;
        }
        res = &mut recv_task => {
            send_task.abort();
            match res {
                Ok(Err(e)) => handler.on_error(&hub, &conn, &e).await,
                _ => handler.on_close(&hub, &conn).await,
            }
        }
    }
}

/// Handle one received frame. Returns false when the connection should
/// close.
async fn handle_frame(
    hub: &Hub,
    handler: &dyn MessageHandler,
    conn: &Connection,
    frame: Message,
) -> bool {
    match frame {
        Message::Text(text) => {
            handler.on_message(hub, conn, &text).await;
            true
        }
        Message::Binary(_) => {
            let _ = hub
                .send_to(
                    &conn.id,
                    ServerMessage::Error {
                        message: "Binary messages not supported".to_string(),
                    },
                )
                .await;
            true
        }
        // Axum answers pings automatically.
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %conn.id, "Client requested close");
            false
        }
    }
}
