//! # Subscribers and receiver discovery.
//!
//! This module provides the [`Subscriber`] trait (the invocation boundary),
//! the [`ReceiverDescriptor`] metadata describing each receiver method, and
//! the [`DescriptorProvider`] chain that discovers descriptors per type.
//!
//! ## Architecture
//! ```text
//! subscribe(target)
//!     │
//!     ▼
//! DescriptorCache ──► StaticIndex (precomputed)
//!     │          └──► SelfDescribing (Subscriber::receivers)
//!     ▼
//! [ReceiverDescriptor { method, params, mode }, ...]
//!     │
//!     ▼
//! Registry: "Type#method" ──► Registration { target, descriptor }
//! ```

mod descriptor;
mod finder;
mod subscriber;

pub use descriptor::{ParamType, ReceiverDescriptor, ThreadMode};
pub use finder::{DescriptorCache, DescriptorProvider, SelfDescribing, StaticIndex};
pub use subscriber::Subscriber;
