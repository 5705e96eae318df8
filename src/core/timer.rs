//! # One-shot cancellable timers.
//!
//! [`schedule_once`] runs a callback after a delay on the tokio runtime unless
//! the returned [`TimerHandle`] is cancelled (or dropped) first.
//!
//! ```text
//! schedule_once(delay, f) ──► tokio::spawn(select! {
//!                                 token.cancelled() → return
//!                                 sleep(delay)      → f()
//!                             })
//! ```
//!
//! Must be called from within a tokio runtime.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Handle to a scheduled callback. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    guard: Option<DropGuard>,
}

impl TimerHandle {
    /// Cancels the timer; the callback will not run if it has not already.
    pub fn cancel(&mut self) {
        // dropping the guard cancels the token
        self.guard.take();
    }

    /// True until [`cancel`](Self::cancel) is called.
    pub fn is_armed(&self) -> bool {
        self.guard.is_some()
    }
}

/// Runs `callback` once after `delay` unless the returned handle is cancelled first.
pub fn schedule_once<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let token = CancellationToken::new();
    let child = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = child.cancelled() => {}
            _ = time::sleep(delay) => callback(),
        }
    });

    TimerHandle {
        guard: Some(token.drop_guard()),
    }
}
