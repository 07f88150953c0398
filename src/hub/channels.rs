//! Channel bookkeeping
//!
//! Channels are named, application-scoped groups of subscribed connection
//! ids. A channel exists exactly while it has subscribers: it is created
//! on first subscribe and pruned when the last subscriber leaves, so a
//! long-lived process never accumulates empty channel entries.
//!
//! A reverse membership index (connection id → joined channels) keeps
//! `remove_connection` proportional to the channels that connection
//! actually belongs to rather than the total channel count.

use std::collections::{HashMap, HashSet};

use super::registry::ConnectionId;

/// (application id, channel name) → subscriber set, with reverse index.
#[derive(Debug, Default)]
pub struct ChannelManager {
    /// app id → channel name → subscriber ids
    channels: HashMap<String, HashMap<String, HashSet<ConnectionId>>>,
    /// connection id → (app id, channel name) memberships
    memberships: HashMap<ConnectionId, HashSet<(String, String)>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a channel, creating the channel if absent.
    ///
    /// Returns false if the connection was already subscribed.
    pub fn subscribe(&mut self, app: &str, channel: &str, id: &str) -> bool {
        let added = self
            .channels
            .entry(app.to_string())
            .or_default()
            .entry(channel.to_string())
            .or_default()
            .insert(id.to_string());

        if added {
            self.memberships
                .entry(id.to_string())
                .or_default()
                .insert((app.to_string(), channel.to_string()));
        }

        added
    }

    /// Remove a connection from a channel, pruning the channel (and the
    /// app entry) once empty. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, app: &str, channel: &str, id: &str) -> bool {
        let removed = self.remove_subscriber(app, channel, id);

        if removed {
            if let Some(joined) = self.memberships.get_mut(id) {
                joined.remove(&(app.to_string(), channel.to_string()));
                if joined.is_empty() {
                    self.memberships.remove(id);
                }
            }
        }

        removed
    }

    /// Remove a connection from every channel it belongs to.
    ///
    /// Returns the number of channels the connection was removed from.
    pub fn remove_connection(&mut self, id: &str) -> usize {
        let joined = match self.memberships.remove(id) {
            Some(joined) => joined,
            None => return 0,
        };

        let count = joined.len();
        for (app, channel) in joined {
            self.remove_subscriber(&app, &channel, id);
        }
        count
    }

    /// Channel names with at least one subscriber for the app, sorted.
    pub fn channel_names(&self, app: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .channels
            .get(app)
            .map(|chans| chans.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Subscriber ids of a channel, sorted. Empty for unknown channels.
    pub fn subscribers(&self, app: &str, channel: &str) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self
            .channels
            .get(app)
            .and_then(|chans| chans.get(channel))
            .map(|subs| subs.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn subscriber_count(&self, app: &str, channel: &str) -> usize {
        self.channels
            .get(app)
            .and_then(|chans| chans.get(channel))
            .map(|subs| subs.len())
            .unwrap_or(0)
    }

    /// Channels a connection currently belongs to.
    pub fn memberships_of(&self, id: &str) -> Vec<(String, String)> {
        self.memberships
            .get(id)
            .map(|joined| joined.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn remove_subscriber(&mut self, app: &str, channel: &str, id: &str) -> bool {
        let Some(chans) = self.channels.get_mut(app) else {
            return false;
        };
        let Some(subs) = chans.get_mut(channel) else {
            return false;
        };

        let removed = subs.remove(id);
        if subs.is_empty() {
            chans.remove(channel);
        }
        if chans.is_empty() {
            self.channels.remove(app);
        }
        removed
    }
}
