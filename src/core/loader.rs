//! # Loader: named tasks under one loading activity.
//!
//! [`Loader`] is the public surface of the crate. It registers tasks, routes
//! explicit and automatic settlement to the right [`TaskRecord`], records
//! values and errors, and finalizes the [`Aggregate`] once the last active
//! task settled.
//!
//! ## Architecture
//! ```text
//! start(spec) ─► lock ─► TaskRecord{gen} into `active` ─► begin_cycle? ─► unlock
//!                  │                                          └─ yes: emit Start (inline)
//!                  └─► lock ─► timer (schedule_once) / driver (tokio::spawn)
//!
//! finish / error / timer / driver
//!      └─► settle(name, gen) ─► lock
//!             ├─ record value → `completed`  |  error → `errors`, `last_error`
//!             ├─ TaskRecord::settle  (task waiters see the outcome first)
//!             └─ `active` empty? ─► Aggregate::finalize ─► unlock ─► emit Finish / Error
//! ```
//!
//! ## Rules
//! - State is behind one mutex, never held across `.await` or while handlers run.
//! - First settlement wins; later `finish`/`error`/timeouts for the same
//!   registration are no-ops.
//! - Timers and drivers hold a `Weak` reference; dropping every `Loader`
//!   handle fails pending futures with [`LoaderError::Closed`].
//! - Drivers are detached. Settling a record never cancels the caller's work.
//! - A cycle with any task error rejects, even if the failed name was
//!   started again and then finished.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time;

use super::aggregate::{Aggregate, LoadState, WaitAll};
use super::builder::LoaderBuilder;
use super::record::{Settlement, TaskFuture, TaskRecord};
use super::timer::schedule_once;
use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::events::{Bus, Emitter, Event, EventKind, EventPayload, Subscription, TaskResults};
use crate::logging::LogSink;
use crate::tasks::TaskSpec;

/// Tracks named asynchronous tasks and their aggregate completion.
///
/// Cheap to clone; clones share the same state.
pub struct Loader<T> {
    pub(crate) inner: Arc<Inner<T>>,
}

pub(crate) struct Inner<T> {
    name: Arc<str>,
    cfg: LoaderConfig,
    log: Arc<dyn LogSink>,
    emitter: Emitter<T>,
    bus: Bus<T>,
    state: Mutex<State<T>>,
}

struct State<T> {
    next_generation: u64,
    active: HashMap<String, TaskRecord<T>>,
    completed: TaskResults<T>,
    errors: HashMap<String, LoaderError>,
    last_error: Option<LoaderError>,
    aggregate: Aggregate<T>,
}

impl<T> State<T> {
    fn is_settled(&self, name: &str) -> bool {
        self.errors.contains_key(name) || self.completed.contains_key(name)
    }
}

impl<T> Clone for Loader<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Loader<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a loader with default configuration and the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(LoaderConfig::named(name)).build()
    }

    /// Creates a loader from an explicit configuration.
    pub fn with_config(cfg: LoaderConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a builder for attaching a log sink.
    pub fn builder(cfg: LoaderConfig) -> LoaderBuilder<T> {
        LoaderBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: LoaderConfig, log: Arc<dyn LogSink>) -> Self {
        let name: Arc<str> = Arc::from(cfg.name.as_str());
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            inner: Arc::new(Inner {
                name,
                cfg,
                log,
                emitter: Emitter::new(),
                bus,
                state: Mutex::new(State {
                    next_generation: 0,
                    active: HashMap::new(),
                    completed: TaskResults::new(),
                    errors: HashMap::new(),
                    last_error: None,
                    aggregate: Aggregate::new(),
                }),
            }),
        }
    }

    pub(crate) fn from_weak(weak: &Weak<Inner<T>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn downgrade(&self) -> Weak<Inner<T>> {
        Arc::downgrade(&self.inner)
    }

    /// Loader name (used in logs and error messages).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Starts tracking a task and returns a future for its outcome.
    ///
    /// Accepts a [`TaskSpec`] or a bare task name. If this is the first active
    /// task, the loader enters `Loading` and emits [`EventKind::Start`] before
    /// returning. Starting a name that is still active supersedes the earlier
    /// registration: its timer is cancelled and its future fails with
    /// [`LoaderError::Superseded`]. A wrapped future is never cancelled by the
    /// loader; once its record settled, its outcome is ignored.
    ///
    /// Timeouts and wrapped futures need a tokio runtime. Outside one they are
    /// skipped (and logged) instead of panicking.
    pub fn start(&self, spec: impl Into<TaskSpec<T>>) -> TaskFuture<T> {
        let (name, timeout, wrapped) = spec.into().into_parts();
        let timeout = timeout.or_else(|| self.inner.cfg.default_task_timeout());
        self.inner
            .log
            .log(&self.inner.name, &format!("started loading: {name}"));

        let (generation, task, first) = {
            let mut st = self.inner.lock();
            let generation = st.next_generation;
            st.next_generation += 1;

            let first = st.aggregate.begin_cycle();
            if first {
                st.errors.clear();
            }
            st.completed.remove(&name);
            st.errors.remove(&name);

            let record = TaskRecord::new(generation);
            let task = record.watch(Arc::clone(&self.inner.name));
            if let Some(old) = st.active.insert(name.clone(), record) {
                old.settle(Err(LoaderError::Superseded { task: name.clone() }));
            }
            (generation, task, first)
        };

        if first {
            self.inner.publish(EventPayload::Start);
        }

        if timeout.is_some() || wrapped.is_some() {
            self.arm(&name, generation, timeout, wrapped);
        }
        task
    }

    /// Attaches the timeout timer and spawns the wrapped-future driver for a
    /// registration, unless it already settled.
    ///
    /// Without a tokio runtime both are skipped and logged; the task then only
    /// settles through `finish`/`error`.
    fn arm(
        &self,
        name: &str,
        generation: u64,
        timeout: Option<Duration>,
        wrapped: Option<BoxFuture<'static, Settlement<T>>>,
    ) {
        if Handle::try_current().is_err() {
            let err = LoaderError::failed("no tokio runtime");
            self.inner.log.log_error(
                &self.inner.name,
                &format!("timeout and future not armed: {name}"),
                &err,
            );
            return;
        }

        let mut st = self.inner.lock();
        let Some(record) = st
            .active
            .get_mut(name)
            .filter(|r| r.generation() == generation)
        else {
            return;
        };

        if let Some(dur) = timeout {
            let weak = self.downgrade();
            let task = name.to_string();
            record.arm_timer(schedule_once(dur, move || {
                if let Some(loader) = Loader::from_weak(&weak) {
                    let err = LoaderError::TaskTimeout {
                        task: task.clone(),
                        timeout: dur,
                    };
                    loader.settle(&task, Some(generation), Err(err));
                }
            }));
        }

        if let Some(fut) = wrapped {
            let weak = self.downgrade();
            let task = name.to_string();
            // detached: the work outlives an earlier settlement of its record
            tokio::spawn(async move {
                let outcome = fut.await;
                if let Some(loader) = Loader::from_weak(&weak) {
                    loader.settle(&task, Some(generation), outcome);
                }
            });
        }
    }

    /// Resolves task `name` with `value`.
    ///
    /// No-op (returns `false`) if the task already settled. Otherwise the
    /// value is recorded even if no task of that name is active.
    pub fn finish(&self, name: &str, value: T) -> bool {
        {
            let mut st = self.inner.lock();
            if st.is_settled(name) {
                return false;
            }
            if !st.active.contains_key(name) {
                st.completed.insert(name.to_string(), value);
                drop(st);
                self.inner
                    .log
                    .log(&self.inner.name, &format!("finished loading: {name}"));
                return true;
            }
        }
        self.settle(name, None, Ok(value))
    }

    /// Fails task `name` with `err`.
    ///
    /// No-op (returns `false`) if the task already settled or is not active.
    pub fn error(&self, name: &str, err: impl Into<LoaderError>) -> bool {
        self.settle(name, None, Err(err.into()))
    }

    /// Settles the active record for `name`; `generation` pins a specific registration.
    pub(crate) fn settle(
        &self,
        name: &str,
        generation: Option<u64>,
        outcome: Settlement<T>,
    ) -> bool {
        let (log_err, payload) = {
            let mut st = self.inner.lock();
            let matches = st
                .active
                .get(name)
                .is_some_and(|r| generation.is_none_or(|g| r.generation() == g));
            if !matches || st.is_settled(name) {
                return false;
            }
            let Some(record) = st.active.remove(name) else {
                return false;
            };

            match &outcome {
                Ok(value) => {
                    st.completed.insert(name.to_string(), value.clone());
                }
                Err(err) => {
                    st.errors.insert(name.to_string(), err.clone());
                    st.last_error = Some(err.clone());
                    st.aggregate.mark_failed();
                }
            }
            let log_err = outcome.as_ref().err().cloned();
            record.settle(outcome);

            let payload = if st.active.is_empty() {
                let State {
                    aggregate,
                    completed,
                    errors,
                    ..
                } = &mut *st;
                Some(aggregate.finalize(&self.inner.name, completed, errors))
            } else {
                None
            };
            (log_err, payload)
        };

        match log_err {
            None => self
                .inner
                .log
                .log(&self.inner.name, &format!("finished loading: {name}")),
            Some(err) => {
                self.inner
                    .log
                    .log_error(&self.inner.name, &format!("failed loading: {name}"), &err)
            }
        }

        if let Some(payload) = payload {
            match &payload {
                EventPayload::Error(err) => {
                    self.inner
                        .log
                        .log_error(&self.inner.name, "error(s) loading", err)
                }
                _ => self
                    .inner
                    .log
                    .log(&self.inner.name, "finished loading all tasks"),
            }
            self.inner.publish(payload);
        }
        true
    }

    /// Returns a future for task `name`.
    ///
    /// - active task → settles with the task
    /// - settled task → immediately ready with the recorded value/error
    /// - unknown name → `Err(TaskNotFound)` right away
    ///
    /// With `timeout`, the future fails with [`LoaderError::WaitTimeout`] if
    /// the task does not settle in time.
    pub fn wait(
        &self,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<TaskFuture<T>, LoaderError> {
        let target = {
            let st = self.inner.lock();
            if let Some(record) = st.active.get(name) {
                record.watch(Arc::clone(&self.inner.name))
            } else if let Some(value) = st.completed.get(name) {
                future::ready(Ok(value.clone())).boxed()
            } else if let Some(err) = st.errors.get(name) {
                future::ready(Err(err.clone())).boxed()
            } else {
                return Err(LoaderError::TaskNotFound {
                    loader: self.inner.name.to_string(),
                    task: name.to_string(),
                });
            }
        };
        Ok(self.race(Some(name), timeout, target))
    }

    /// Returns a future for the aggregate outcome of the current cycle.
    ///
    /// Before the first `start` this is the first cycle's outcome; after a
    /// cycle finished it is that cycle's outcome until the next `start`.
    pub fn wait_all(&self, timeout: Option<Duration>) -> WaitAll<T> {
        let target = self
            .inner
            .lock()
            .aggregate
            .watch(Arc::clone(&self.inner.name));
        self.race(None, timeout, target)
    }

    fn race<R: Send + 'static>(
        &self,
        task: Option<&str>,
        timeout: Option<Duration>,
        target: BoxFuture<'static, Result<R, LoaderError>>,
    ) -> BoxFuture<'static, Result<R, LoaderError>> {
        let Some(dur) = timeout.filter(|d| !d.is_zero()) else {
            return target;
        };
        let err = LoaderError::WaitTimeout {
            loader: self.inner.name.to_string(),
            task: task.map(str::to_string),
            timeout: dur,
        };
        async move {
            match time::timeout(dur, target).await {
                Ok(outcome) => outcome,
                Err(_elapsed) => Err(err),
            }
        }
        .boxed()
    }

    /// Without a name: the loader is in a loading cycle.
    /// With a name: the task is active and has no recorded value.
    pub fn is_loading(&self, name: Option<&str>) -> bool {
        let st = self.inner.lock();
        match name {
            None => st.aggregate.state() == LoadState::Loading,
            Some(n) => st.active.contains_key(n) && !st.completed.contains_key(n),
        }
    }

    /// Without a name: the last cycle finished.
    /// With a name: the task has a recorded value or error.
    pub fn is_finished(&self, name: Option<&str>) -> bool {
        let st = self.inner.lock();
        match name {
            None => st.aggregate.state() == LoadState::Finished,
            Some(n) => st.is_settled(n),
        }
    }

    /// Current aggregate state.
    pub fn state(&self) -> LoadState {
        self.inner.lock().aggregate.state()
    }

    /// Snapshot of recorded task errors for the current (or last) cycle.
    pub fn errors(&self) -> HashMap<String, LoaderError> {
        self.inner.lock().errors.clone()
    }

    /// The most recently recorded task error.
    pub fn last_error(&self) -> Option<LoaderError> {
        self.inner.lock().last_error.clone()
    }

    /// Snapshot of every recorded task value.
    pub fn results(&self) -> TaskResults<T> {
        self.inner.lock().completed.clone()
    }

    /// Returns sorted list of active task names.
    pub fn active_tasks(&self) -> Vec<String> {
        let st = self.inner.lock();
        let mut names: Vec<String> = st.active.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Registers a synchronous handler for events of `kind`.
    ///
    /// Handlers run inline, in registration order, from the call that caused
    /// the event (`start` for `Start`, the last settlement for `Finish`/`Error`).
    /// They are not deferred to a later turn: a `Finish`/`Error` handler runs
    /// before the `finish`/`error` call (or timer, or wrapped future) that
    /// settled the last task returns. Task futures already hold their outcome
    /// by then. Consumers that want to react on their own turn can use
    /// [`subscribe`](Self::subscribe) instead.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&Event<T>) + Send + Sync + 'static,
    {
        self.inner.emitter.on(kind, handler)
    }

    /// Number of handlers registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.emitter.len(kind)
    }

    /// Creates a broadcast receiver for all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event<T>> {
        self.inner.bus.subscribe()
    }
}

impl<T> Default for Loader<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_config(LoaderConfig::default())
    }
}

impl<T> std::fmt::Debug for Loader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emits inline to handlers, then broadcasts.
    fn publish(&self, payload: EventPayload<T>) {
        let ev = Event::new(Arc::clone(&self.name), payload);
        self.emitter.emit(&ev);
        self.bus.publish(ev);
    }
}
