//! # Broadcast bus for async event consumers.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The loader
//! publishes every lifecycle event to it right after the synchronous
//! [`Emitter`](super::Emitter) handlers ran, so consumers living in their own
//! tokio task can follow a loader without registering callbacks.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: slow receivers get `RecvError::Lagged(n)`.
//! - **No persistence**: events are lost if there are no receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for loader events.
#[derive(Debug)]
pub struct Bus<T> {
    tx: broadcast::Sender<Event<T>>,
}

impl<T: Clone> Bus<T> {
    /// Creates a new bus with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event<T>>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// With no receivers the event is dropped.
    pub fn publish(&self, ev: Event<T>) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<T>> {
        self.tx.subscribe()
    }
}
