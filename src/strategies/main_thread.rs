use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::Registration;
use crate::events::{Event, PendingEvent, PendingEventPool};
use crate::ui::UiDispatcher;

use super::{DeliveryStrategy, deliver};

struct MainQueue {
    pending: VecDeque<PendingEvent>,
    scheduled: bool,
}

struct Shared {
    queue: Mutex<MainQueue>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MainQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs on the UI thread until the queue is empty.
    fn drain(&self) {
        loop {
            let next = {
                let mut queue = self.lock();
                match queue.pending.pop_front() {
                    Some(pending) => pending,
                    None => {
                        queue.scheduled = false;
                        return;
                    }
                }
            };
            deliver(next, false);
        }
    }
}

/// Hand-off to the UI thread for callers that are not on it.
///
/// Envelopes queue up here; at most one drain is scheduled on the
/// [`UiDispatcher`] at a time, and it delivers them one by one in order.
/// The event's delay is not honored on this path.
pub struct MainThreadStrategy {
    pool: Arc<PendingEventPool>,
    dispatcher: Arc<dyn UiDispatcher>,
    shared: Arc<Shared>,
}

impl MainThreadStrategy {
    /// Strategy scheduling onto `dispatcher`.
    pub fn new(pool: Arc<PendingEventPool>, dispatcher: Arc<dyn UiDispatcher>) -> Self {
        Self {
            pool,
            dispatcher,
            shared: Arc::new(Shared {
                queue: Mutex::new(MainQueue {
                    pending: VecDeque::new(),
                    scheduled: false,
                }),
            }),
        }
    }

    /// Number of envelopes waiting for the UI thread.
    pub fn queued(&self) -> usize {
        self.shared.lock().pending.len()
    }
}

impl DeliveryStrategy for MainThreadStrategy {
    fn accept(&self, event: Event, registration: Arc<Registration>) {
        let pending = self.pool.obtain(event, registration);

        let schedule = {
            let mut queue = self.shared.lock();
            queue.pending.push_back(pending);
            !std::mem::replace(&mut queue.scheduled, true)
        };

        if schedule {
            let shared = Arc::clone(&self.shared);
            self.dispatcher.schedule(Box::new(move || shared.drain()));
        }
    }

    fn name(&self) -> &'static str {
        "main_thread"
    }
}
