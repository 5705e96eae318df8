//! # taskloader
//!
//! **taskloader** tracks independently started, named async tasks under one
//! logical "loading" activity. Callers get both a per-task signal ("is task X
//! done, and with what?") and one aggregate signal ("is everything done?")
//! without fanning out and joining futures by hand.
//!
//! The crate does not run work for you: tasks are either settled explicitly
//! (`finish`/`error`) or driven by a future you hand over at registration.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   start("config")   start("textures", timeout)   start(TaskSpec::with_future(..))
//!         │                    │                              │
//!         ▼                    ▼                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Loader                                                           │
//! │  - active:    name → TaskRecord (settlement channel, timer)       │
//! │  - completed: name → value          errors: name → LoaderError    │
//! │  - Aggregate: Idle → Loading → Finished (final settlement)        │
//! └──────┬──────────────────────────┬──────────────────────────┬──────┘
//!        │ Start (first task)       │ Finish (no errors)       │ Error (≥1 error)
//!        ▼                          ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Emitter (inline handlers, `on`)   →   Bus (broadcast, `subscribe`)│
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                     user handlers / parent loader (sub-loader bridge)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ──start──► Loading ──last task settles──► Finished ──start──► Loading ...
//!
//! task: Pending ──finish / wrapped Ok──────────► Resolved
//!               ──error / wrapped Err / timeout─► Rejected
//!               (first settlement wins, later ones are no-ops)
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types                          |
//! |-----------------|----------------------------------------------------------|------------------------------------|
//! | **Loader**      | Register, settle, wait on and query tasks.               | [`Loader`], [`TaskSpec`]           |
//! | **Events**      | Start/Finish/Error as inline handlers or broadcast.       | [`Event`], [`EventKind`], [`Subscription`] |
//! | **Composition** | A child loader drives a named task of a parent.          | [`SubLoaderLink`]                  |
//! | **Errors**      | Typed, cloneable errors for tasks, waits and cycles.     | [`LoaderError`]                    |
//! | **Logging**     | Injected sink, no-op by default.                         | [`LogSink`], [`NoopLog`]           |
//! | **Configuration** | Loader name, bus capacity, default task timeout.       | [`LoaderConfig`]                   |
//!
//! ## Optional features
//! - `logging` (default): exports [`TracingLog`], a sink forwarding to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskloader::{Loader, LoaderError, TaskSpec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), LoaderError> {
//!     let loader: Loader<u32> = Loader::new("Assets");
//!
//!     let _ = loader.start("config");
//!     let textures = loader.start(
//!         TaskSpec::new("textures")
//!             .with_timeout(Duration::from_secs(5))
//!             .with_future(async { Ok::<_, LoaderError>(42) }),
//!     );
//!
//!     loader.finish("config", 1);
//!     assert_eq!(textures.await?, 42);
//!
//!     let all = loader.wait_all(None).await?;
//!     assert_eq!(all.len(), 2);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod logging;
mod tasks;

// ---- Public re-exports ----

pub use config::LoaderConfig;
pub use core::{
    LoadState, Loader, LoaderBuilder, Settlement, SubLoaderLink, TaskFuture, TimerHandle, WaitAll,
    schedule_once,
};
pub use error::LoaderError;
pub use events::{Event, EventKind, EventPayload, Subscription, TaskResults};
pub use logging::{LogSink, LogWriter, NoopLog};
pub use tasks::{DEFAULT_TASK, TaskSpec};

// Optional: forward lifecycle messages to `tracing`.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use logging::TracingLog;
