//! # Registry of live receivers.
//!
//! Maps `"Type#method"` keys to [`Registration`]s.
//!
//! ## Rules
//! - At most one registration per key; a batch containing any taken key is
//!   rejected as a whole and nothing is inserted.
//! - Unregistering stops at the first missing key; keys removed before it stay removed.
//! - Writers (`register`/`unregister`) are serialized by one mutex.
//! - Readers (`lookup`) go straight to the concurrent map and get an
//!   `Arc<Registration>`, never a partially written entry.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::error::SignalError;
use crate::events::receiver_key;
use crate::subscribers::{ReceiverDescriptor, Subscriber};

/// One receiver method of one live subscriber.
pub struct Registration {
    key: String,
    target: Arc<dyn Subscriber>,
    descriptor: ReceiverDescriptor,
}

impl Registration {
    /// Binds `descriptor` to `target`.
    pub fn new(target: Arc<dyn Subscriber>, descriptor: ReceiverDescriptor) -> Self {
        Self {
            key: receiver_key(target.type_name(), descriptor.method()),
            target,
            descriptor,
        }
    }

    /// Registry key (`"Type#method"`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Subscriber owning the receiver.
    pub fn target(&self) -> &Arc<dyn Subscriber> {
        &self.target
    }

    /// Receiver metadata.
    pub fn descriptor(&self) -> &ReceiverDescriptor {
        &self.descriptor
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("mode", &self.descriptor.mode())
            .field("params", &self.descriptor.params().len())
            .finish()
    }
}

/// Concurrent key → registration table.
#[derive(Default)]
pub(crate) struct Registry {
    entries: DashMap<String, Arc<Registration>>,
    writer: Mutex<()>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers every descriptor of `target`, or none of them.
    pub(crate) fn register(
        &self,
        target: &Arc<dyn Subscriber>,
        descriptors: &[ReceiverDescriptor],
    ) -> Result<(), SignalError> {
        let type_name = target.type_name();
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(taken) = descriptors
            .iter()
            .find(|d| self.entries.contains_key(&receiver_key(type_name, d.method())))
        {
            return Err(SignalError::DuplicateSubscription {
                type_name,
                method: taken.method().to_string(),
            });
        }

        for descriptor in descriptors {
            let registration = Registration::new(Arc::clone(target), descriptor.clone());
            self.entries
                .insert(registration.key().to_string(), Arc::new(registration));
        }
        Ok(())
    }

    /// Removes `target`'s receivers in order, stopping at the first missing one.
    pub(crate) fn unregister(
        &self,
        target: &dyn Subscriber,
        descriptors: &[ReceiverDescriptor],
    ) -> Result<(), SignalError> {
        let type_name = target.type_name();
        let mut removed = Vec::with_capacity(descriptors.len());

        let outcome = {
            let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            descriptors.iter().try_for_each(|descriptor| {
                match self.entries.remove(&receiver_key(type_name, descriptor.method())) {
                    Some((_, registration)) => {
                        removed.push(registration);
                        Ok(())
                    }
                    None => Err(SignalError::NotRegistered {
                        type_name,
                        method: descriptor.method().to_string(),
                    }),
                }
            })
        };

        // The last reference to the subscriber may go here; never under the writer lock.
        drop(removed);
        outcome
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<Arc<Registration>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Registered keys, sorted.
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort_unstable();
        keys
    }
}
