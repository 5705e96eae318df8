//! # Aggregate completion for one loader.
//!
//! [`Aggregate`] owns the cycle state and the "final" settlement that
//! `wait_all` observes:
//!
//! ```text
//!   Idle ──begin_cycle──► Loading ──finalize──► Finished ──begin_cycle──► Loading ...
//!                            │                     │
//!                            │        errors empty? ├─ yes → resolve(results snapshot)
//!                            │                     └─ no  → reject(AggregateFailure)
//! ```
//!
//! ## Rules
//! - The final channel settles **once per cycle**.
//! - `begin_cycle` only replaces the channel if the previous one already
//!   settled, so `wait_all` issued while idle observes the next cycle.
//! - Waiters of an old cycle keep that cycle's outcome.
//! - A task error latches the cycle as failed until the next `begin_cycle`,
//!   so restarting the failed name cannot turn the cycle into a success.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;

use crate::core::record::settled;
use crate::error::LoaderError;
use crate::events::{EventPayload, TaskResults};

/// Aggregate state of a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No task was started yet.
    #[default]
    Idle,
    /// At least one task is active.
    Loading,
    /// Every task of the last cycle settled.
    Finished,
}

type FinalOutcome<T> = Result<Arc<TaskResults<T>>, LoaderError>;

/// Future resolving to the outcome of a loading cycle.
pub type WaitAll<T> = futures::future::BoxFuture<'static, Result<TaskResults<T>, LoaderError>>;

pub(crate) struct Aggregate<T> {
    state: LoadState,
    failed: bool,
    tx: watch::Sender<Option<FinalOutcome<T>>>,
}

impl<T> Aggregate<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            state: LoadState::Idle,
            failed: false,
            tx,
        }
    }

    pub(crate) fn state(&self) -> LoadState {
        self.state
    }

    /// Enters `Loading`. Returns `true` on an Idle/Finished → Loading transition.
    pub(crate) fn begin_cycle(&mut self) -> bool {
        if self.state == LoadState::Loading {
            return false;
        }
        if self.tx.borrow().is_some() {
            let (tx, _rx) = watch::channel(None);
            self.tx = tx;
        }
        self.state = LoadState::Loading;
        self.failed = false;
        true
    }

    /// Records that a task of the current cycle failed.
    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }

    /// Settles the current cycle and enters `Finished`.
    ///
    /// Resolves with a snapshot of `completed` when no task of the cycle
    /// failed, otherwise rejects with [`LoaderError::AggregateFailure`].
    pub(crate) fn finalize(
        &mut self,
        loader: &str,
        completed: &TaskResults<T>,
        errors: &HashMap<String, LoaderError>,
    ) -> EventPayload<T> {
        self.state = LoadState::Finished;

        let (outcome, payload) = if !self.failed && errors.is_empty() {
            let results = Arc::new(completed.clone());
            (Ok(Arc::clone(&results)), EventPayload::Finish(results))
        } else {
            let err = LoaderError::AggregateFailure {
                loader: loader.to_string(),
            };
            (Err(err.clone()), EventPayload::Error(err))
        };

        self.tx.send_replace(Some(outcome));
        payload
    }

    /// Future observing the current (or, while idle, the next) cycle.
    pub(crate) fn watch(&self, loader: Arc<str>) -> WaitAll<T> {
        settled(self.tx.subscribe(), loader)
            .map(|res| res.map(|results| (*results).clone()))
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn begin_cycle_transitions_once() {
        let mut agg: Aggregate<u8> = Aggregate::new();
        assert_eq!(agg.state(), LoadState::Idle);
        assert!(agg.begin_cycle());
        assert!(!agg.begin_cycle());
        assert_eq!(agg.state(), LoadState::Loading);
    }

    #[tokio::test]
    async fn watcher_registered_while_idle_sees_first_cycle() {
        let mut agg: Aggregate<u8> = Aggregate::new();
        let waiter = agg.watch("l".into());

        agg.begin_cycle();
        let completed = TaskResults::from([("foo".to_string(), 1)]);
        let payload = agg.finalize("l", &completed, &HashMap::new());

        assert!(matches!(payload, EventPayload::Finish(_)));
        assert_eq!(agg.state(), LoadState::Finished);
        assert_eq!(waiter.await, Ok(completed));
    }

    #[tokio::test]
    async fn old_cycle_waiters_keep_their_outcome() {
        let mut agg: Aggregate<u8> = Aggregate::new();
        agg.begin_cycle();
        let first = agg.watch("l".into());
        let errors = HashMap::from([("foo".to_string(), LoaderError::failed("bar"))]);
        agg.finalize("l", &TaskResults::new(), &errors);

        // next cycle starts before the first waiter was polled
        assert!(agg.begin_cycle());
        let second = agg.watch("l".into());
        agg.finalize("l", &TaskResults::new(), &HashMap::new());

        assert_eq!(
            first.await,
            Err(LoaderError::AggregateFailure { loader: "l".into() })
        );
        assert_eq!(second.await, Ok(TaskResults::new()));
    }

    #[tokio::test]
    async fn failure_latch_outlives_cleared_errors() {
        let mut agg: Aggregate<u8> = Aggregate::new();
        agg.begin_cycle();
        agg.mark_failed();
        let waiter = agg.watch("l".into());

        let completed = TaskResults::from([("foo".to_string(), 1)]);
        let payload = agg.finalize("l", &completed, &HashMap::new());
        assert!(matches!(payload, EventPayload::Error(_)));
        assert_eq!(
            waiter.await,
            Err(LoaderError::AggregateFailure { loader: "l".into() })
        );

        // a new cycle starts clean
        assert!(agg.begin_cycle());
        let payload = agg.finalize("l", &completed, &HashMap::new());
        assert!(matches!(payload, EventPayload::Finish(_)));
    }
}
