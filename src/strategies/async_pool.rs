use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::core::{Config, Registration};
use crate::error::SignalError;
use crate::events::{Event, PendingEventPool};

use super::{DeliveryStrategy, deliver};

/// One pool task per event on an elastic set of worker threads.
///
/// Backed by the blocking pool of a private tokio runtime: threads are
/// created on demand, reused while busy, and retired after
/// [`Config::async_keep_alive`] of idleness. Deliveries may overlap, so no
/// ordering holds between events, not even from the same sender.
pub struct AsyncStrategy {
    pool: Arc<PendingEventPool>,
    runtime: Option<Runtime>,
}

impl AsyncStrategy {
    /// Builds the worker pool from `cfg`.
    pub fn new(pool: Arc<PendingEventPool>, cfg: &Config) -> Result<Self, SignalError> {
        let mut builder = Builder::new_multi_thread();
        builder
            .worker_threads(1)
            .thread_name(cfg.async_thread_name.clone())
            .thread_keep_alive(cfg.async_keep_alive);
        if let Some(limit) = cfg.async_thread_limit() {
            builder.max_blocking_threads(limit);
        }

        let runtime = builder.build().map_err(|source| SignalError::Spawn {
            worker: "async pool",
            source,
        })?;

        Ok(Self {
            pool,
            runtime: Some(runtime),
        })
    }
}

impl DeliveryStrategy for AsyncStrategy {
    fn accept(&self, event: Event, registration: Arc<Registration>) {
        let Some(runtime) = &self.runtime else {
            tracing::error!("async pool is shut down, event dropped");
            return;
        };

        let pending = self.pool.obtain(event, registration);
        runtime.spawn_blocking(move || deliver(pending, true));
    }

    fn name(&self) -> &'static str {
        "async"
    }
}

impl Drop for AsyncStrategy {
    fn drop(&mut self) {
        // Must not block: the bus may be dropped from inside another runtime.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
