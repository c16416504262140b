//! # Deferred delivery strategies.
//!
//! Each strategy takes an (event, registration) pair that the dispatch core
//! could not deliver inline and runs it somewhere else:
//!
//! | Strategy                  | Runs on                 | Order          | Delay    |
//! |---------------------------|-------------------------|----------------|----------|
//! | [`MainThreadStrategy`]    | UI dispatcher           | FIFO           | ignored  |
//! | [`BackgroundStrategy`]    | one dedicated thread    | global FIFO    | honored  |
//! | [`AsyncStrategy`]         | elastic thread pool     | none           | honored  |
//!
//! All of them wrap the pair in a pooled [`PendingEvent`]; the envelope goes
//! back to the pool when it is dropped, whatever the outcome of the handler.

mod async_pool;
mod background;
mod main_thread;

use std::sync::Arc;
use std::thread;

use crate::core::{Registration, invoke};
use crate::events::{Event, PendingEvent};

pub use async_pool::AsyncStrategy;
pub use background::BackgroundStrategy;
pub use main_thread::MainThreadStrategy;

/// Deferred hand-off of one event to its receiver.
pub trait DeliveryStrategy: Send + Sync {
    /// Takes ownership of `event` for later delivery to `registration`.
    fn accept(&self, event: Event, registration: Arc<Registration>);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str;
}

/// Runs one envelope on the current worker thread.
///
/// `honor_delay` sleeps for the event's delay first.
pub(crate) fn deliver(pending: PendingEvent, honor_delay: bool) {
    let (Some(event), Some(registration)) = (pending.event(), pending.registration()) else {
        tracing::error!(slot = ?pending.slot(), "empty pending event");
        return;
    };

    if honor_delay {
        let wait = event.wait();
        if !wait.is_zero() {
            thread::sleep(wait);
        }
    }

    if let Err(err) = invoke(registration, event.args()) {
        tracing::error!(key = registration.key(), error = %err, label = err.as_label(), "deferred delivery failed");
    }
}
