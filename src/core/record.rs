//! # Per-task settlement record.
//!
//! A [`TaskRecord`] lives in the loader's `active` table from `start` until
//! the task settles. It owns:
//! - the settlement channel (`watch`, `None` = pending) observed by every
//!   future handed out for this task,
//! - the task timeout timer, if any.
//!
//! ## Rules
//! - Settlement is **single use**: only the first outcome is stored.
//! - Settling consumes the record and cancels its timer.
//! - A wrapped future keeps running after its record settled; its outcome is
//!   dropped by the loader's generation check.
//! - `generation` identifies one registration; a record that replaced an
//!   earlier one under the same name never matches the earlier callbacks.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::watch;

use crate::core::timer::TimerHandle;
use crate::error::LoaderError;

/// Outcome of one task.
pub type Settlement<T> = Result<T, LoaderError>;

/// Future resolving to a task's value or error.
pub type TaskFuture<T> = BoxFuture<'static, Settlement<T>>;

/// Settlement state of one registered task.
pub(crate) struct TaskRecord<T> {
    generation: u64,
    tx: watch::Sender<Option<Settlement<T>>>,
    timer: Option<TimerHandle>,
}

impl<T> TaskRecord<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(generation: u64) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            generation,
            tx,
            timer: None,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Future observing this record's settlement.
    pub(crate) fn watch(&self, loader: Arc<str>) -> TaskFuture<T> {
        settled(self.tx.subscribe(), loader)
    }

    pub(crate) fn arm_timer(&mut self, timer: TimerHandle) {
        self.timer = Some(timer);
    }

    /// Stores `outcome` if still pending and cancels the timer.
    ///
    /// Returns `false` if the record had already settled.
    pub(crate) fn settle(mut self, outcome: Settlement<T>) -> bool {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
            true
        })
    }
}

/// Waits until the channel holds an outcome and returns a clone of it.
///
/// A sender dropped while still pending means the loader went away.
pub(crate) fn settled<R>(
    mut rx: watch::Receiver<Option<Result<R, LoaderError>>>,
    loader: Arc<str>,
) -> BoxFuture<'static, Result<R, LoaderError>>
where
    R: Clone + Send + Sync + 'static,
{
    async move {
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(slot) => (*slot).clone(),
            Err(_closed) => None,
        };
        outcome.unwrap_or_else(|| {
            Err(LoaderError::Closed {
                loader: loader.to_string(),
            })
        })
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timer::schedule_once;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn first_settlement_wins() {
        let record: TaskRecord<u32> = TaskRecord::new(7);
        assert_eq!(record.generation(), 7);
        let fut = record.watch("l".into());

        assert!(record.settle(Ok(1)));
        assert_eq!(fut.await, Ok(1));
    }

    #[tokio::test]
    async fn dropped_pending_record_reports_closed() {
        let record: TaskRecord<u32> = TaskRecord::new(1);
        let fut = record.watch("assets".into());
        drop(record);
        assert_eq!(
            fut.await,
            Err(LoaderError::Closed {
                loader: "assets".into()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn settling_cancels_the_timer() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        let mut record: TaskRecord<()> = TaskRecord::new(1);
        record.arm_timer(schedule_once(Duration::from_millis(10), move || {
            flag.store(true, Ordering::SeqCst);
        }));
        assert!(record.settle(Err(LoaderError::failed("boom"))));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
