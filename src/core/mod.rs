//! Loader core: task records, aggregate completion and composition.
//!
//! The only public entry point from this module is [`Loader`]; the other
//! public items are the types its operations hand out.
//!
//! Internal modules:
//! - [`record`]: per-task settlement state (first settlement wins);
//! - [`aggregate`]: cycle state and the final settlement;
//! - [`loader`]: registration, settlement routing, waiting and queries;
//! - [`subloader`]: child loader → parent task wiring;
//! - [`timer`]: one-shot cancellable timers on tokio;
//! - [`builder`]: loader construction with collaborators.

mod aggregate;
mod builder;
mod loader;
mod record;
mod subloader;
mod timer;

pub use aggregate::{LoadState, WaitAll};
pub use builder::LoaderBuilder;
pub use loader::Loader;
pub use record::{Settlement, TaskFuture};
pub use subloader::SubLoaderLink;
pub use timer::{TimerHandle, schedule_once};
