//! # Task registration spec.
//!
//! Defines [`TaskSpec`] the bundle handed to [`Loader::start`](crate::Loader::start):
//! a task name, an optional timeout and an optional already-running future
//! whose output settles the task.
//!
//! A spec can be created:
//! - **Explicitly** with [`TaskSpec::new`] / [`TaskSpec::main`] and the `with_*` methods
//! - **From a name** via `From<&str>` / `From<String>` (no timeout, no future)

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::LoaderError;

/// Name used when a task is started without one.
pub const DEFAULT_TASK: &str = "main";

/// Specification for registering a task with a loader.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use taskloader::{LoaderError, TaskSpec};
///
/// let spec: TaskSpec<u32> = TaskSpec::new("config")
///     .with_timeout(Duration::from_secs(5))
///     .with_future(async { Ok::<_, LoaderError>(7) });
/// assert_eq!(spec.name(), "config");
/// assert!(spec.has_future());
///
/// let bare: TaskSpec<u32> = "textures".into();
/// assert!(bare.timeout().is_none());
/// ```
pub struct TaskSpec<T> {
    name: Cow<'static, str>,
    timeout: Option<Duration>,
    future: Option<BoxFuture<'static, Result<T, LoaderError>>>,
}

impl<T> TaskSpec<T> {
    /// Creates a spec for the task `name`, with no timeout and no wrapped future.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            timeout: None,
            future: None,
        }
    }

    /// Creates a spec for the default task ([`DEFAULT_TASK`]).
    pub fn main() -> Self {
        Self::new(DEFAULT_TASK)
    }

    /// Returns a new spec with the given timeout.
    ///
    /// A zero duration means no timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout).filter(|d| !d.is_zero());
        self
    }

    /// Returns a new spec whose settlement is driven by `fut`.
    ///
    /// `Ok` resolves the task, `Err` fails it (converted with `Into<LoaderError>`).
    pub fn with_future<F, E>(mut self, fut: F) -> Self
    where
        T: 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<LoaderError> + 'static,
    {
        self.future = Some(fut.map(|res| res.map_err(Into::into)).boxed());
        self
    }

    /// Returns the task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// True if a future was attached with [`with_future`](Self::with_future).
    pub fn has_future(&self) -> bool {
        self.future.is_some()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        Option<Duration>,
        Option<BoxFuture<'static, Result<T, LoaderError>>>,
    ) {
        (self.name.into_owned(), self.timeout, self.future)
    }
}

impl<T> Default for TaskSpec<T> {
    fn default() -> Self {
        Self::main()
    }
}

impl<T> From<&'static str> for TaskSpec<T> {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl<T> From<String> for TaskSpec<T> {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl<T> fmt::Debug for TaskSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("future", &self.future.is_some())
            .finish()
    }
}
