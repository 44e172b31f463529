//! Cross-view refresh notifications.
//!
//! Mutations publish a [`DataChanged`] event; any view holding a receiver
//! decides how to refresh itself.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 100;

/// What kind of data changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Users,
    Taxonomy,
}

/// How subscribed views should refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Refresh {
    /// Re-fetch the affected lists and statistics in place
    Soft,
    /// Reload the whole view after a delay
    FullReload { delay_ms: u64 },
}

impl Refresh {
    pub fn full_reload(delay: Duration) -> Self {
        Refresh::FullReload {
            delay_ms: delay.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataChanged {
    pub entity: Entity,
    pub refresh: Refresh,
}

/// Broadcast channel shared by the orchestrator and the views.
#[derive(Clone)]
pub struct EventBus {
    event_tx: broadcast::Sender<DataChanged>,
}

impl EventBus {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { event_tx }
    }

    /// Publish an event. Having no subscriber is not an error.
    pub fn publish(&self, event: DataChanged) {
        debug!("Publishing {:?}", event);
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<DataChanged> {
        self.event_tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
