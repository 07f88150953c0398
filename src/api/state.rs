//! Application State
//!
//! Shared state accessible by all API handlers. The hub, route table, and
//! scheduler are constructed once at startup and passed by reference here
//! rather than living as ambient static state, which keeps them swappable
//! in tests.

use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::BroadcastScheduler;
use crate::hub::{Hub, HubConfig};
use crate::routing::{Endpoint, RouteError, RouteTable};
use crate::ws::{ChannelHandler, EchoHandler, MessageHandler};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Route table consulted by the dispatcher
    pub routes: Arc<RouteTable>,
    /// Connection registry + channel manager
    pub hub: Arc<Hub>,
    /// Broadcast scheduler for heartbeats and event triggers
    pub scheduler: Arc<BroadcastScheduler>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Echo endpoint handler (one instance for all `/` connections)
    echo_handler: Arc<EchoHandler>,
    /// App endpoint handler (one instance for all `/app/{appKey}` connections)
    channel_handler: Arc<ChannelHandler>,
}

impl AppState {
    /// Create state with the default route set and hub limits.
    pub fn new(hub_config: HubConfig) -> Result<Self, RouteError> {
        let routes = Arc::new(RouteTable::with_default_routes()?);
        Ok(Self::with_routes(routes, hub_config))
    }

    /// Create state over an explicit route table.
    pub fn with_routes(routes: Arc<RouteTable>, hub_config: HubConfig) -> Self {
        let hub = Arc::new(Hub::new(hub_config));
        let scheduler = Arc::new(BroadcastScheduler::new(Arc::clone(&hub)));

        Self {
            routes,
            hub,
            scheduler,
            start_time: Instant::now(),
            echo_handler: Arc::new(EchoHandler),
            channel_handler: Arc::new(ChannelHandler),
        }
    }

    /// The handler instance serving a WebSocket endpoint.
    pub fn socket_handler(&self, endpoint: Endpoint) -> Option<Arc<dyn MessageHandler>> {
        match endpoint {
            Endpoint::EchoSocket => Some(Arc::clone(&self.echo_handler) as Arc<dyn MessageHandler>),
            Endpoint::AppSocket => {
                Some(Arc::clone(&self.channel_handler) as Arc<dyn MessageHandler>)
            }
            _ => None,
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
