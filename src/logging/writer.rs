//! # LogWriter: simple message printer
//!
//! A minimal sink that prints loader messages to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [loader] name="Assets" msg="started loading: textures"
//! [loader-error] name="Assets" msg="failed loading: textures" err="task 'textures' timed out (5s)"
//! ```

use super::LogSink;
use crate::error::LoaderError;

/// Stdout writer sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for LogWriter {
    fn log(&self, loader: &str, message: &str) {
        println!("[loader] name={loader:?} msg={message:?}");
    }

    fn log_error(&self, loader: &str, message: &str, error: &LoaderError) {
        println!(
            "[loader-error] name={loader:?} msg={message:?} err={:?}",
            error.to_string()
        );
    }
}
