//! # Per-calling-thread send state.
//!
//! Each (thread, bus) pair owns a [`SendingThreadState`]: a FIFO of outgoing
//! events plus the "draining" and "on UI thread" flags. The state lives in a
//! thread-local map keyed by bus id, so isolated bus instances never share it.
//!
//! ```text
//! send(A) ─► enqueue ─► not draining ─► DrainGuard ─► pop A ─► handler ─► send(B)
//!                                           │                              │
//!                                           │                 enqueue, draining: return
//!                                           ├─► pop B ─► handler
//!                                           └─► queue empty ─► drop guard ─► remove state
//! ```
//!
//! The guard removes the state on every exit path, including `?` early returns
//! out of the drain loop, so a thread keeps no entry for a bus it is not
//! currently sending on.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::Event;

/// Source of bus identities.
static BUS_IDS: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_bus_id() -> u64 {
    BUS_IDS.fetch_add(1, Ordering::Relaxed)
}

#[derive(Default)]
struct SendingThreadState {
    queue: VecDeque<Event>,
    draining: bool,
    on_ui_thread: bool,
}

thread_local! {
    static SENDING: RefCell<HashMap<u64, SendingThreadState>> = RefCell::new(HashMap::new());
}

fn with_state<R>(bus: u64, f: impl FnOnce(&mut SendingThreadState) -> R) -> R {
    SENDING.with(|states| f(states.borrow_mut().entry(bus).or_default()))
}

/// Appends `event` to this thread's queue for `bus`.
///
/// Returns a guard when the caller must drain; `None` when a drain is already
/// running further up this thread's stack.
pub(crate) fn enqueue(bus: u64, event: Event, is_ui_thread: impl FnOnce() -> bool) -> Option<DrainGuard> {
    with_state(bus, |state| {
        state.queue.push_back(event);
        if state.draining {
            return None;
        }
        state.draining = true;
        state.on_ui_thread = is_ui_thread();
        Some(DrainGuard { bus })
    })
}

/// Ownership of this thread's drain for one bus.
pub(crate) struct DrainGuard {
    bus: u64,
}

impl DrainGuard {
    /// Pops the next queued event.
    pub(crate) fn next(&self) -> Option<Event> {
        with_state(self.bus, |state| state.queue.pop_front())
    }

    /// Whether the drain started on the UI thread.
    pub(crate) fn on_ui_thread(&self) -> bool {
        with_state(self.bus, |state| state.on_ui_thread)
    }
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        let bus = self.bus;
        let leftover = SENDING
            .try_with(|states| states.borrow_mut().remove(&bus))
            .ok()
            .flatten()
            .map(|state| state.queue)
            .unwrap_or_default();

        // Outside the borrow: dropping an argument may send again.
        if !leftover.is_empty() {
            tracing::warn!(dropped = leftover.len(), "send aborted, discarding queued events");
        }
        drop(leftover);
    }
}
