//! Broadcast Scheduler
//!
//! Drives the repeating heartbeat timer and the ad-hoc, channel-scoped
//! triggers fired by the control plane. Delivery is fire-and-forget
//! fan-out: no acknowledgment, no retry; a failed send tears down that
//! one connection inside the hub and never aborts the rest.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::hub::Hub;
use crate::ws::ServerMessage;

/// Schedules repeating and ad-hoc broadcasts over the hub.
pub struct BroadcastScheduler {
    hub: Arc<Hub>,
}

impl BroadcastScheduler {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    /// Register a repeating broadcast: every `interval`, send the
    /// producer's payload to every connection currently registered.
    ///
    /// Slow ticks are skipped, not queued. Returns the task handle;
    /// aborting it stops the schedule.
    pub fn schedule<F>(&self, interval: Duration, producer: F) -> JoinHandle<()>
    where
        F: Fn() -> ServerMessage + Send + 'static,
    {
        let hub = Arc::clone(&self.hub);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it so the first
            // payload goes out one full interval after startup.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let attempts = hub.broadcast_all(producer()).await;
                tracing::trace!(connections = attempts, "Broadcast tick");
            }
        })
    }

    /// Start the periodic heartbeat broadcast.
    pub fn start_heartbeat(&self, interval: Duration) -> JoinHandle<()> {
        tracing::info!(interval_secs = interval.as_secs(), "Starting heartbeat broadcast");
        self.schedule(interval, ServerMessage::heartbeat_now)
    }

    /// Send a payload to the current subscribers of one channel.
    ///
    /// Returns the number of send attempts.
    pub async fn broadcast_to_channel(
        &self,
        app: &str,
        channel: &str,
        message: ServerMessage,
    ) -> usize {
        self.hub.broadcast_channel(app, channel, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Connection;
    use tokio::sync::mpsc;

    fn heartbeat() -> ServerMessage {
        ServerMessage::Heartbeat {
            time: "2024-01-01 00:00:00".to_string(),
        }
    }

    async fn register(hub: &Hub) -> (String, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Connection::new(Some("app1".to_string()), tx);
        let id = conn.id.clone();
        hub.register(conn).await.unwrap();
        (id, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_delivers_each_tick() {
        let hub = Arc::new(Hub::default());
        let (_a, mut rx_a) = register(&hub).await;
        let (_b, mut rx_b) = register(&hub).await;
        let (_c, mut rx_c) = register(&hub).await;

        let scheduler = BroadcastScheduler::new(Arc::clone(&hub));
        let handle = scheduler.schedule(Duration::from_secs(1), heartbeat);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            match rx.try_recv().unwrap() {
                ServerMessage::Heartbeat { time } => {
                    assert_eq!(time, "2024-01-01 00:00:00");
                }
                other => panic!("unexpected message: {:?}", other),
            }
        }

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_connection_misses_later_ticks() {
        let hub = Arc::new(Hub::default());
        let (id_a, mut rx_a) = register(&hub).await;
        let (_b, mut rx_b) = register(&hub).await;

        let scheduler = BroadcastScheduler::new(Arc::clone(&hub));
        let handle = scheduler.schedule(Duration::from_secs(1), heartbeat);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());

        hub.unregister(&id_a).await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());

        handle.abort();
    }

    #[tokio::test]
    async fn test_broadcast_to_channel_scopes_delivery() {
        let hub = Arc::new(Hub::default());
        let (id_a, mut rx_a) = register(&hub).await;
        let (_b, mut rx_b) = register(&hub).await;
        hub.subscribe("app1", "general", &id_a).await.unwrap();

        let scheduler = BroadcastScheduler::new(Arc::clone(&hub));
        let attempts = scheduler
            .broadcast_to_channel("app1", "general", heartbeat())
            .await;

        assert_eq!(attempts, 1);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_channel_is_empty() {
        let hub = Arc::new(Hub::default());
        let scheduler = BroadcastScheduler::new(hub);

        let attempts = scheduler
            .broadcast_to_channel("app1", "doesnotexist", heartbeat())
            .await;
        assert_eq!(attempts, 0);
    }
}
