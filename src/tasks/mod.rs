//! # Task registration.
//!
//! - [`TaskSpec`] - name, optional timeout and optional wrapped future for `Loader::start`
//! - [`DEFAULT_TASK`] - name used when none is given

mod spec;

pub use spec::{DEFAULT_TASK, TaskSpec};
