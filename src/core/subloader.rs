//! # Sub-loader bridge.
//!
//! Maps a child loader's lifecycle onto one named task of a parent:
//!
//! ```text
//! child: Start  ──► parent.start(name)
//! child: Finish ──► parent.finish(name, map(results))
//! child: Error  ──► parent.error(name, aggregate error)
//! ```
//!
//! The parent's "all done" therefore waits for every wired child's cycle.
//! The bridge only calls the parent's public operations and holds it weakly,
//! so a child never keeps its parent alive.

use std::sync::Arc;

use super::loader::Loader;
use crate::events::{EventKind, Subscription, TaskResults};

/// Handle to the subscriptions wiring a child loader into a parent task.
///
/// Dropping the link keeps the wiring in place; call [`detach`](Self::detach)
/// to remove it.
#[derive(Debug)]
pub struct SubLoaderLink {
    task: String,
    subscriptions: Vec<Subscription>,
}

impl SubLoaderLink {
    /// Name of the parent task driven by the child.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Removes the wiring. Returns how many handlers were still registered.
    pub fn detach(self) -> usize {
        self.subscriptions
            .into_iter()
            .map(Subscription::unsubscribe)
            .filter(|removed| *removed)
            .count()
    }
}

impl<T> Loader<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wires `child` into this loader as task `name`, converting the child's
    /// results with `From`.
    pub fn add_sub_loader<U>(&self, child: &Loader<U>, name: impl Into<String>) -> SubLoaderLink
    where
        U: Clone + Send + Sync + 'static,
        T: From<TaskResults<U>>,
    {
        self.add_sub_loader_with(child, name, |results| T::from(results.clone()))
    }

    /// Wires `child` into this loader as task `name`; `map` turns the child's
    /// results into the value recorded for the task.
    pub fn add_sub_loader_with<U, F>(
        &self,
        child: &Loader<U>,
        name: impl Into<String>,
        map: F,
    ) -> SubLoaderLink
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&TaskResults<U>) -> T + Send + Sync + 'static,
    {
        let task: String = name.into();
        let task: Arc<str> = Arc::from(task);
        let mut subscriptions = Vec::with_capacity(3);

        let parent = self.downgrade();
        let name = Arc::clone(&task);
        subscriptions.push(child.on(EventKind::Start, move |_| {
            if let Some(parent) = Loader::from_weak(&parent) {
                // the parent's task future is observed through `wait`
                let _ = parent.start(name.to_string());
            }
        }));

        let parent = self.downgrade();
        let name = Arc::clone(&task);
        subscriptions.push(child.on(EventKind::Finish, move |ev| {
            if let (Some(parent), Some(results)) = (Loader::from_weak(&parent), ev.results()) {
                parent.finish(&name, map(results));
            }
        }));

        let parent = self.downgrade();
        let name = Arc::clone(&task);
        subscriptions.push(child.on(EventKind::Error, move |ev| {
            if let (Some(parent), Some(err)) = (Loader::from_weak(&parent), ev.error()) {
                parent.error(&name, err.clone());
            }
        }));

        SubLoaderLink {
            task: task.to_string(),
            subscriptions,
        }
    }
}
