use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;

use crate::core::Registration;
use crate::error::SignalError;
use crate::events::{Event, PendingEvent, PendingEventPool};

use super::{DeliveryStrategy, deliver};

/// Serial delivery on one dedicated worker thread.
///
/// `accept` enqueues and returns. The worker takes one envelope at a time,
/// sleeps for its delay, invokes, releases. Every background event is
/// delivered in acceptance order, whichever thread sent it; a long delay
/// holds back everything queued behind it.
pub struct BackgroundStrategy {
    pool: Arc<PendingEventPool>,
    tx: mpsc::UnboundedSender<PendingEvent>,
}

impl BackgroundStrategy {
    /// Spawns the worker thread under `name`.
    pub fn spawn(pool: Arc<PendingEventPool>, name: &str) -> Result<Self, SignalError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<PendingEvent>();

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Some(pending) = rx.blocking_recv() {
                    deliver(pending, true);
                }
                tracing::debug!("background worker stopped");
            })
            .map_err(|source| SignalError::Spawn {
                worker: "background worker",
                source,
            })?;

        Ok(Self { pool, tx })
    }
}

impl DeliveryStrategy for BackgroundStrategy {
    fn accept(&self, event: Event, registration: Arc<Registration>) {
        let pending = self.pool.obtain(event, registration);
        if self.tx.send(pending).is_err() {
            tracing::error!("background worker is gone, event dropped");
        }
    }

    fn name(&self) -> &'static str {
        "background"
    }
}
