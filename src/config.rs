//! # Loader configuration.
//!
//! Provides [`LoaderConfig`] centralized settings for one [`Loader`](crate::Loader).
//!
//! ## Sentinel values
//! - `task_timeout = 0s` → tasks without an explicit timeout never time out
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Configuration for a single loader.
///
/// ## Field semantics
/// - `name`: Loader name used in logs and error messages
/// - `bus_capacity`: Broadcast ring buffer size for async subscribers (min 1)
/// - `task_timeout`: Timeout applied to tasks started without one (`0s` = none)
#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// Human-readable loader name.
    pub name: String,

    /// Capacity of the event broadcast channel.
    ///
    /// Receivers obtained from [`Loader::subscribe`](crate::Loader::subscribe)
    /// that lag behind by more than this many events observe `Lagged`.
    pub bus_capacity: usize,

    /// Default per-task timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = applied to every task whose [`TaskSpec`](crate::TaskSpec) has no timeout
    ///
    /// The timer runs on tokio. A task started outside a runtime gets no timer
    /// (the loader logs it) and settles only through `finish`/`error`.
    pub task_timeout: Duration,
}

impl LoaderConfig {
    /// Creates the default configuration with the given loader name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the default per-task timeout as an `Option`.
    #[inline]
    pub fn default_task_timeout(&self) -> Option<Duration> {
        if self.task_timeout == Duration::ZERO {
            None
        } else {
            Some(self.task_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for LoaderConfig {
    /// Default configuration:
    ///
    /// - `name = "Loading"`
    /// - `bus_capacity = 1024`
    /// - `task_timeout = 0s` (no timeout)
    fn default() -> Self {
        Self {
            name: "Loading".to_string(),
            bus_capacity: 1024,
            task_timeout: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_are_sentinels() {
        let cfg = LoaderConfig {
            bus_capacity: 0,
            ..LoaderConfig::named("assets")
        };
        assert_eq!(cfg.name, "assets");
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.default_task_timeout(), None);

        let cfg = LoaderConfig {
            task_timeout: Duration::from_secs(3),
            ..LoaderConfig::default()
        };
        assert_eq!(cfg.default_task_timeout(), Some(Duration::from_secs(3)));
    }
}
