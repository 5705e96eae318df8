//! # Emitter: synchronous per-kind fan-out.
//!
//! [`Emitter`] keeps the handlers registered through
//! [`Loader::on`](crate::Loader::on) and calls them **inline** from the call
//! that produced the event. This is what lets a `Start` event be observed
//! before `start()` returns, and what the sub-loader bridge relies on.
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │  (snapshot handlers for ev.kind(), lock released)
//!        ├──► handler 1 (&Event)
//!        ├──► handler 2 (&Event)
//!        └──► handler N (&Event)
//! ```
//!
//! ## Rules
//! - Handlers run in registration order.
//! - The handler table is not locked while handlers run, so a handler may
//!   register or remove handlers (changes apply to the next emit).
//! - [`Subscription`] only holds a weak reference; it never keeps the emitter alive.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::event::{Event, EventKind};

/// Shared handler callback.
pub type Handler<T> = Arc<dyn Fn(&Event<T>) + Send + Sync + 'static>;

struct Entry<T> {
    id: u64,
    kind: EventKind,
    handler: Handler<T>,
}

struct Table<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry<T>>>,
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64) -> bool;
}

impl<T: Send + 'static> Detach for Table<T> {
    fn detach(&self, id: u64) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }
}

/// Registry of synchronous event handlers.
pub struct Emitter<T> {
    table: Arc<Table<T>>,
}

impl<T: Send + 'static> Emitter<T> {
    /// Creates an empty emitter.
    pub fn new() -> Self {
        Self {
            table: Arc::new(Table {
                next_id: AtomicU64::new(1),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Registers `handler` for events of `kind`.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&Event<T>) + Send + Sync + 'static,
    {
        let id = self.table.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        self.table
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry {
                id,
                kind,
                handler: Arc::new(handler),
            });

        let table: Arc<dyn Detach> = self.table.clone();
        Subscription {
            id,
            kind,
            table: Arc::downgrade(&table),
        }
    }

    /// Calls every handler registered for the event's kind.
    ///
    /// Returns the number of handlers invoked.
    pub fn emit(&self, ev: &Event<T>) -> usize {
        let kind = ev.kind();
        let handlers: Vec<Handler<T>> = {
            let entries = self
                .table
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            entries
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| Arc::clone(&e.handler))
                .collect()
        };

        for handler in &handlers {
            handler(ev);
        }
        handlers.len()
    }

    /// Number of handlers registered for `kind`.
    pub fn len(&self, kind: EventKind) -> usize {
        self.table
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }
}

impl<T: Send + 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`Emitter::on`]; removes the handler on [`unsubscribe`](Self::unsubscribe).
///
/// Dropping a `Subscription` keeps the handler registered.
pub struct Subscription {
    id: u64,
    kind: EventKind,
    table: Weak<dyn Detach>,
}

impl Subscription {
    /// The event kind this subscription listens to.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Removes the handler. Returns `false` if it was already gone
    /// (or the emitter no longer exists).
    pub fn unsubscribe(self) -> bool {
        match self.table.upgrade() {
            Some(table) => table.detach(self.id),
            None => false,
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventPayload;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn handlers_only_see_their_kind() {
        let emitter: Emitter<()> = Emitter::new();
        let starts = Arc::new(AtomicUsize::new(0));

        let counter = starts.clone();
        let _sub = emitter.on(EventKind::Start, move |_| {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        });

        assert_eq!(emitter.emit(&Event::new("l", EventPayload::Start)), 1);
        let err = crate::LoaderError::AggregateFailure { loader: "l".into() };
        assert_eq!(emitter.emit(&Event::new("l", EventPayload::Error(err))), 0);
        assert_eq!(starts.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_removes_handler_once() {
        let emitter: Emitter<()> = Emitter::new();
        let sub = emitter.on(EventKind::Finish, |_| {});
        assert_eq!(emitter.len(EventKind::Finish), 1);
        assert_eq!(sub.kind(), EventKind::Finish);

        assert!(sub.unsubscribe());
        assert_eq!(emitter.len(EventKind::Finish), 0);
    }

    #[test]
    fn unsubscribe_after_emitter_dropped_is_noop() {
        let emitter: Emitter<()> = Emitter::new();
        let sub = emitter.on(EventKind::Start, |_| {});
        drop(emitter);
        assert!(!sub.unsubscribe());
    }
}
