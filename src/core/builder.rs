use std::sync::Arc;

use super::loader::Loader;
use crate::config::LoaderConfig;
use crate::logging::{LogSink, NoopLog};

/// Builder for constructing a [`Loader`] with optional collaborators.
pub struct LoaderBuilder<T> {
    cfg: LoaderConfig,
    log: Arc<dyn LogSink>,
    _values: std::marker::PhantomData<fn() -> T>,
}

impl<T> LoaderBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration and a no-op log sink.
    pub fn new(cfg: LoaderConfig) -> Self {
        Self {
            cfg,
            log: Arc::new(NoopLog),
            _values: std::marker::PhantomData,
        }
    }

    /// Sets the sink receiving lifecycle log messages.
    pub fn with_log(mut self, log: impl LogSink) -> Self {
        self.log = Arc::new(log);
        self
    }

    /// Sets a shared log sink (e.g. one sink for a whole loader tree).
    pub fn with_shared_log(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    /// Builds and returns the loader.
    pub fn build(self) -> Loader<T> {
        Loader::from_parts(self.cfg, self.log)
    }
}
