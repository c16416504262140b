//! # Bus configuration.
//!
//! Provides [`Config`], the settings a [`SignalBus`](crate::SignalBus) is built from.
//!
//! ## Sentinel values
//! - `async_max_threads = 0` → runtime default cap on async worker threads
//! - `pool_capacity = 0` → every deferred envelope is an overflow allocation

use std::time::Duration;

/// Settings for the pending-event pool and the delivery workers.
///
/// ## Field semantics
/// - `pool_capacity`: preallocated envelopes shared by all deferred strategies
/// - `background_thread_name`: name of the single background worker thread
/// - `async_thread_name`: name given to async pool threads
/// - `async_max_threads`: upper bound on async pool threads (`0` = runtime default)
/// - `async_keep_alive`: how long an idle async pool thread is kept around
/// - `main_thread_name`: name of the built-in UI thread, used only when no
///   host dispatcher is supplied
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of pooled envelopes.
    pub pool_capacity: usize,

    /// Background worker thread name.
    pub background_thread_name: String,

    /// Async pool thread name.
    pub async_thread_name: String,

    /// Maximum number of async pool threads.
    ///
    /// - `0` = runtime default
    /// - `n > 0` = at most `n` async deliveries run at once; the rest wait
    pub async_max_threads: usize,

    /// Idle time after which an async pool thread exits.
    pub async_keep_alive: Duration,

    /// Built-in UI thread name.
    pub main_thread_name: String,
}

impl Config {
    /// Returns the async thread cap as an `Option`.
    ///
    /// - `None` → runtime default
    /// - `Some(n)` → at most `n` threads
    #[inline]
    pub fn async_thread_limit(&self) -> Option<usize> {
        if self.async_max_threads == 0 {
            None
        } else {
            Some(self.async_max_threads)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `pool_capacity = 10`
    /// - `background_thread_name = "signal-background"`
    /// - `async_thread_name = "signal-async"`
    /// - `async_max_threads = 0` (runtime default)
    /// - `async_keep_alive = 60s` (cached thread pool)
    /// - `main_thread_name = "signal-main"`
    fn default() -> Self {
        Self {
            pool_capacity: 10,
            background_thread_name: "signal-background".to_string(),
            async_thread_name: "signal-async".to_string(),
            async_max_threads: 0,
            async_keep_alive: Duration::from_secs(60),
            main_thread_name: "signal-main".to_string(),
        }
    }
}
