//! # Logging sinks.
//!
//! The loader never logs through process-global state; it writes lifecycle
//! messages to the [`LogSink`] given at construction. Logging is purely
//! observational: a sink can drop everything without affecting behavior.
//!
//! ## Provided sinks
//! - [`NoopLog`] the default, discards everything
//! - [`LogWriter`] prints `[tag] key=value` lines to stdout (demo/debug)
//! - [`TracingLog`] forwards to `tracing` (enabled via the `logging` feature)
//!
//! ## Example: custom sink
//! ```rust
//! use taskloader::{LogSink, LoaderError};
//!
//! struct Stderr;
//!
//! impl LogSink for Stderr {
//!     fn log(&self, loader: &str, message: &str) {
//!         eprintln!("{loader}: {message}");
//!     }
//!     fn log_error(&self, loader: &str, message: &str, error: &LoaderError) {
//!         eprintln!("{loader}: {message}: {error}");
//!     }
//! }
//! ```

mod writer;

#[cfg(feature = "logging")]
mod trace;

use crate::error::LoaderError;

pub use writer::LogWriter;

#[cfg(feature = "logging")]
pub use trace::TracingLog;

/// Destination for loader lifecycle messages.
pub trait LogSink: Send + Sync + 'static {
    /// Informational lifecycle message (task started/finished, cycle finished).
    fn log(&self, loader: &str, message: &str);

    /// Failure message with the error that caused it.
    fn log_error(&self, loader: &str, message: &str, error: &LoaderError);
}

/// Sink that discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLog;

impl LogSink for NoopLog {
    #[inline]
    fn log(&self, _loader: &str, _message: &str) {}

    #[inline]
    fn log_error(&self, _loader: &str, _message: &str, _error: &LoaderError) {}
}
