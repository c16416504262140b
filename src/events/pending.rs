//! # Recyclable envelopes for deferred delivery.
//!
//! [`PendingEventPool`] keeps a fixed number of preallocated envelopes and a
//! stack of free slot indices. Deferred strategies wrap each accepted
//! (event, registration) pair in a [`PendingEvent`] obtained from the pool.
//!
//! ## Rules
//! - **Pooled**: a free slot is popped, its envelope is filled and handed out.
//! - **Overflow**: when no slot is free a fresh envelope is allocated; it owns
//!   no slot (`slot() == None`) and is simply dropped on release.
//! - **Release on drop**: dropping a [`PendingEvent`] clears the envelope and
//!   pushes its slot back, so panics in a handler cannot leak slots.
//! - **One lock**: obtain and release are serialized by a single pool mutex.
//!
//! ```text
//! obtain(ev, reg) ──► free.pop() ─┬─ Some(i) ──► slots[i].take() ──► PendingEvent{slot: i}
//!                                 └─ None    ──► Box::new(..)    ──► PendingEvent{slot: -}
//! drop(PendingEvent) ──► clear ──► slot? ─┬─ Some(i) ──► slots[i] = env; free.push(i)
//!                                         └─ None    ──► discard
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::Registration;
use crate::events::Event;

/// Storage cell recycled through the pool.
#[derive(Default)]
struct Envelope {
    event: Option<Event>,
    registration: Option<Arc<Registration>>,
    slot: Option<usize>,
}

impl Envelope {
    /// Empties the envelope, handing back what it carried.
    fn take_contents(&mut self) -> (Option<Event>, Option<Arc<Registration>>) {
        (self.event.take(), self.registration.take())
    }
}

struct PoolState {
    slots: Vec<Option<Box<Envelope>>>,
    free: Vec<usize>,
}

/// Fixed-capacity arena of dispatch envelopes shared by all strategies.
pub struct PendingEventPool {
    capacity: usize,
    state: Mutex<PoolState>,
}

impl PendingEventPool {
    /// Preallocates `capacity` envelopes and seeds the free stack with every slot.
    pub fn new(capacity: usize) -> Arc<Self> {
        let slots = (0..capacity)
            .map(|slot| {
                Some(Box::new(Envelope {
                    slot: Some(slot),
                    ..Envelope::default()
                }))
            })
            .collect();

        Arc::new(Self {
            capacity,
            state: Mutex::new(PoolState {
                slots,
                free: (0..capacity).collect(),
            }),
        })
    }

    /// Wraps `event` and `registration` in an envelope, pooled if a slot is free.
    pub fn obtain(self: &Arc<Self>, event: Event, registration: Arc<Registration>) -> PendingEvent {
        let pooled = {
            let mut state = self.lock();
            match state.free.pop() {
                Some(slot) => state.slots[slot].take(),
                None => None,
            }
        };

        let mut envelope = pooled.unwrap_or_else(|| {
            tracing::debug!(capacity = self.capacity, "pending event pool exhausted, allocating overflow envelope");
            Box::default()
        });
        envelope.event = Some(event);
        envelope.registration = Some(registration);

        PendingEvent {
            envelope: Some(envelope),
            pool: Arc::clone(self),
        }
    }

    fn release(&self, mut envelope: Box<Envelope>) {
        // Dropped only after the pool lock is released: the last reference to a
        // subscriber or argument may run code that sends again.
        let contents = envelope.take_contents();

        if let Some(slot) = envelope.slot {
            let mut state = self.lock();
            match state.slots.get_mut(slot) {
                Some(cell) if cell.is_none() => {
                    *cell = Some(envelope);
                    state.free.push(slot);
                }
                Some(_) => {
                    tracing::error!(slot, "pending event slot released twice, dropping envelope");
                }
                None => {
                    tracing::error!(slot, capacity = self.capacity, "pending event slot out of range");
                }
            }
        }

        drop(contents);
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configured number of pooled envelopes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of free slots right now.
    pub fn available(&self) -> usize {
        self.lock().free.len()
    }

    /// Snapshot of the free-slot stack (bottom first).
    pub fn free_slots(&self) -> Vec<usize> {
        self.lock().free.clone()
    }
}

/// Envelope handed to a deferred strategy; returns itself to the pool on drop.
pub struct PendingEvent {
    envelope: Option<Box<Envelope>>,
    pool: Arc<PendingEventPool>,
}

impl PendingEvent {
    /// Pool slot owned by this envelope, `None` for overflow envelopes.
    pub fn slot(&self) -> Option<usize> {
        self.envelope.as_ref().and_then(|env| env.slot)
    }

    /// Event carried by this envelope.
    pub fn event(&self) -> Option<&Event> {
        self.envelope.as_ref().and_then(|env| env.event.as_ref())
    }

    /// Registration the event was routed to.
    pub fn registration(&self) -> Option<&Arc<Registration>> {
        self.envelope.as_ref().and_then(|env| env.registration.as_ref())
    }
}

impl Drop for PendingEvent {
    fn drop(&mut self) {
        if let Some(envelope) = self.envelope.take() {
            self.pool.release(envelope);
        }
    }
}
