//! # Event bus for worker events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]: publishing never blocks the
//! worker, and every receiver gets its own copy of each event.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits for receivers.
//! - **Bounded capacity**: one ring buffer shared by all receivers.
//! - **Lag handling**: a slow receiver gets `RecvError::Lagged(n)` and skips `n` events.
//! - **No persistence**: with no receiver at send time the event is dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for worker events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding at most `capacity` pending events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver for events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns the number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
