//! Error type used by the loader and its tasks.
//!
//! [`LoaderError`] covers every way a task, a wait, or a whole loading cycle
//! can fail. It is `Clone` because one settlement is observed by many waiters
//! (the task future, `wait` callers, the aggregate bookkeeping).
//!
//! Like the rest of the crate it provides `as_label`/`as_message` helpers for
//! logs and metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a [`Loader`](crate::Loader).
///
/// Per-task errors (`TaskTimeout`, `Failed`, `Superseded`) settle one task only;
/// `AggregateFailure` is the single error a loading cycle rejects with when at
/// least one of its tasks failed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// `wait` was called for a task that was never started.
    #[error("task not found in {loader} ('{task}')")]
    TaskNotFound {
        /// Name of the loader that was asked.
        loader: String,
        /// The unknown task name.
        task: String,
    },

    /// A task's own timeout elapsed before it settled.
    #[error("task '{task}' timed out ({timeout:?})")]
    TaskTimeout {
        /// The task that timed out.
        task: String,
        /// The timeout given at registration.
        timeout: Duration,
    },

    /// A `wait`/`wait_all` timeout elapsed before the target settled.
    #[error("waiting for {loader}{} timed out ({timeout:?})", task_suffix(.task))]
    WaitTimeout {
        /// Name of the loader being waited on.
        loader: String,
        /// Task name, `None` when waiting on the aggregate.
        task: Option<String>,
        /// The wait timeout.
        timeout: Duration,
    },

    /// The task failed: explicit `error(..)` or its wrapped future returned `Err`.
    #[error("{error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// A loading cycle finished with at least one task error.
    #[error("error(s) loading {loader}")]
    AggregateFailure {
        /// Name of the loader whose cycle failed.
        loader: String,
    },

    /// The task was started again under the same name before it settled.
    #[error("task '{task}' was superseded by a newer start")]
    Superseded {
        /// The task name that was re-registered.
        task: String,
    },

    /// The loader was dropped before the awaited future settled.
    #[error("loader {loader} was dropped")]
    Closed {
        /// Name of the dropped loader.
        loader: String,
    },
}

fn task_suffix(task: &Option<String>) -> String {
    task.as_ref()
        .map(|t| format!(" ({t})"))
        .unwrap_or_default()
}

impl LoaderError {
    /// Creates a [`LoaderError::Failed`] from any displayable error.
    ///
    /// # Example
    /// ```
    /// use taskloader::LoaderError;
    ///
    /// let err = LoaderError::failed("connection refused");
    /// assert_eq!(err.to_string(), "connection refused");
    /// ```
    pub fn failed(error: impl std::fmt::Display) -> Self {
        LoaderError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskloader::LoaderError;
    /// use std::time::Duration;
    ///
    /// let err = LoaderError::TaskTimeout { task: "db".into(), timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LoaderError::TaskNotFound { .. } => "task_not_found",
            LoaderError::TaskTimeout { .. } => "task_timeout",
            LoaderError::WaitTimeout { .. } => "wait_timeout",
            LoaderError::Failed { .. } => "task_failed",
            LoaderError::AggregateFailure { .. } => "aggregate_failure",
            LoaderError::Superseded { .. } => "task_superseded",
            LoaderError::Closed { .. } => "loader_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LoaderError::TaskNotFound { loader, task } => {
                format!("not found: loader={loader} task={task}")
            }
            LoaderError::TaskTimeout { task, timeout } => {
                format!("timeout: task={task} after {timeout:?}")
            }
            LoaderError::WaitTimeout {
                loader,
                task,
                timeout,
            } => format!("wait timeout: loader={loader} task={task:?} after {timeout:?}"),
            LoaderError::Failed { error } => format!("error: {error}"),
            LoaderError::AggregateFailure { loader } => format!("aggregate: loader={loader}"),
            LoaderError::Superseded { task } => format!("superseded: task={task}"),
            LoaderError::Closed { loader } => format!("closed: loader={loader}"),
        }
    }

    /// True for errors that came from a per-task timeout or a wait timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            LoaderError::TaskTimeout { .. } | LoaderError::WaitTimeout { .. }
        )
    }
}

impl From<String> for LoaderError {
    fn from(error: String) -> Self {
        LoaderError::Failed { error }
    }
}

impl From<&str> for LoaderError {
    fn from(error: &str) -> Self {
        LoaderError::failed(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_timeout_message_names_loader_and_task() {
        let err = LoaderError::WaitTimeout {
            loader: "Assets".into(),
            task: Some("textures".into()),
            timeout: Duration::from_millis(50),
        };
        assert_eq!(
            err.to_string(),
            "waiting for Assets (textures) timed out (50ms)"
        );

        let err = LoaderError::WaitTimeout {
            loader: "Assets".into(),
            task: None,
            timeout: Duration::from_millis(50),
        };
        assert_eq!(err.to_string(), "waiting for Assets timed out (50ms)");
        assert!(err.is_timeout());
    }

    #[test]
    fn failed_keeps_the_original_message() {
        let err: LoaderError = "bar".into();
        assert_eq!(err, LoaderError::failed("bar"));
        assert_eq!(err.to_string(), "bar");
        assert_eq!(err.as_label(), "task_failed");
        assert!(!err.is_timeout());
    }
}
