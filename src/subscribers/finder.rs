//! # Receiver discovery and its memo.
//!
//! Discovery is a first-found-wins chain of [`DescriptorProvider`]s:
//!
//! ```text
//! describe(target)
//!     │
//!     ├─ cache hit ─────────────────────────────► Arc<[ReceiverDescriptor]>
//!     │
//!     └─ miss ─► StaticIndex ─► ... ─► SelfDescribing
//!                   │ Some(list) (first wins)       │ all None
//!                   ▼                               ▼
//!            insert-if-absent, return         "no receivers", nothing cached
//! ```
//!
//! A successful discovery is cached forever, even when the list is empty.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use super::{ReceiverDescriptor, Subscriber};

/// Source of receiver descriptors for subscriber types.
pub trait DescriptorProvider: Send + Sync {
    /// Describes `target`'s receivers, or `None` when this provider does not know the type.
    fn describe(&self, target: &dyn Subscriber) -> Option<Vec<ReceiverDescriptor>>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Precomputed table of receivers keyed by subscriber type name.
///
/// # Example
/// ```
/// use signalbus::{ReceiverDescriptor, StaticIndex, ThreadMode};
///
/// struct Player;
///
/// let index = StaticIndex::new()
///     .with::<Player>(vec![ReceiverDescriptor::new("on_join", ThreadMode::Main)]);
/// assert_eq!(index.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct StaticIndex {
    table: HashMap<&'static str, Vec<ReceiverDescriptor>>,
}

impl StaticIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the receivers of `T`.
    #[must_use]
    pub fn with<T: ?Sized + 'static>(mut self, receivers: Vec<ReceiverDescriptor>) -> Self {
        self.insert(std::any::type_name::<T>(), receivers);
        self
    }

    /// Adds receivers under an explicit type name.
    pub fn insert(&mut self, type_name: &'static str, receivers: Vec<ReceiverDescriptor>) {
        self.table.insert(type_name, receivers);
    }

    /// Number of indexed types.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True if no types are indexed.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl DescriptorProvider for StaticIndex {
    fn describe(&self, target: &dyn Subscriber) -> Option<Vec<ReceiverDescriptor>> {
        self.table.get(target.type_name()).cloned()
    }

    fn name(&self) -> &'static str {
        "static_index"
    }
}

/// Fallback provider asking the subscriber to describe itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelfDescribing;

impl DescriptorProvider for SelfDescribing {
    fn describe(&self, target: &dyn Subscriber) -> Option<Vec<ReceiverDescriptor>> {
        target.receivers()
    }

    fn name(&self) -> &'static str {
        "self_describing"
    }
}

/// Write-once memo of receiver lists per subscriber type.
pub struct DescriptorCache {
    providers: Vec<Arc<dyn DescriptorProvider>>,
    memo: DashMap<&'static str, Arc<[ReceiverDescriptor]>>,
}

impl DescriptorCache {
    /// Cache over `providers`, consulted in order.
    pub fn new(providers: Vec<Arc<dyn DescriptorProvider>>) -> Self {
        Self {
            providers,
            memo: DashMap::new(),
        }
    }

    /// Returns `target`'s receivers, discovering them on first use.
    pub fn describe(&self, target: &dyn Subscriber) -> Option<Arc<[ReceiverDescriptor]>> {
        let type_name = target.type_name();
        if let Some(hit) = self.memo.get(type_name) {
            return Some(Arc::clone(hit.value()));
        }

        let Some((provider, found)) = self
            .providers
            .iter()
            .find_map(|p| p.describe(target).map(|found| (p.name(), found)))
        else {
            tracing::info!(subscriber = type_name, "can not fetch subscriber receivers");
            return None;
        };

        tracing::debug!(subscriber = type_name, provider, receivers = found.len(), "receivers discovered");
        let entry = self
            .memo
            .entry(type_name)
            .or_insert_with(|| Arc::from(found));
        Some(Arc::clone(entry.value()))
    }

    /// True if `type_name` has a cached receiver list.
    pub fn is_cached(&self, type_name: &str) -> bool {
        self.memo.contains_key(type_name)
    }
}
