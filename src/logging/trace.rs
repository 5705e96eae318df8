use super::LogSink;
use crate::error::LoaderError;

/// Sink that forwards loader messages to `tracing`.
///
/// Informational messages become `info!` events, failures become `warn!`
/// events carrying the error label so they can be filtered.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn log(&self, loader: &str, message: &str) {
        tracing::info!(loader, "{message}");
    }

    fn log_error(&self, loader: &str, message: &str, error: &LoaderError) {
        tracing::warn!(loader, error = %error, label = error.as_label(), "{message}");
    }
}
