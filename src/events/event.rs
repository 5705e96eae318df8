//! # Lifecycle events emitted by a loader.
//!
//! A loader publishes exactly three kinds of events:
//! - [`EventKind::Start`]: the first task of a loading cycle was started
//! - [`EventKind::Finish`]: every task of the cycle settled without error
//! - [`EventKind::Error`]: every task of the cycle settled, at least one failed
//!
//! The payload is a closed enum ([`EventPayload`]) so handlers match on typed
//! data instead of downcasting.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use taskloader::{Event, EventKind, EventPayload};
//!
//! let ev: Event<u32> = Event::new("assets", EventPayload::Start);
//! assert_eq!(ev.kind(), EventKind::Start);
//! assert_eq!(&*ev.loader, "assets");
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::LoaderError;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Values recorded for successfully finished tasks, keyed by task name.
pub type TaskResults<T> = HashMap<String, T>;

/// Classification of loader events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Idle/Finished → Loading transition.
    Start,
    /// The cycle settled without task errors.
    Finish,
    /// The cycle settled with at least one task error.
    Error,
}

/// Typed payload per event kind.
#[derive(Debug, Clone)]
pub enum EventPayload<T> {
    Start,
    /// Snapshot of every recorded task value.
    Finish(Arc<TaskResults<T>>),
    /// The aggregate error ([`LoaderError::AggregateFailure`]).
    Error(LoaderError),
}

impl<T> EventPayload<T> {
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Start => EventKind::Start,
            EventPayload::Finish(_) => EventKind::Finish,
            EventPayload::Error(_) => EventKind::Error,
        }
    }
}

/// Loader event with metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `loader`: name of the emitting loader
#[derive(Debug, Clone)]
pub struct Event<T> {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Name of the loader that emitted the event.
    pub loader: Arc<str>,
    /// Kind-specific data.
    pub payload: EventPayload<T>,
}

impl<T> Event<T> {
    /// Creates a new event with current timestamp and next sequence number.
    pub fn new(loader: impl Into<Arc<str>>, payload: EventPayload<T>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            loader: loader.into(),
            payload,
        }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Returns the results snapshot of a `Finish` event.
    #[inline]
    pub fn results(&self) -> Option<&TaskResults<T>> {
        match &self.payload {
            EventPayload::Finish(results) => Some(results),
            _ => None,
        }
    }

    /// Returns the aggregate error of an `Error` event.
    #[inline]
    pub fn error(&self) -> Option<&LoaderError> {
        match &self.payload {
            EventPayload::Error(err) => Some(err),
            _ => None,
        }
    }
}
