//! Events and the envelopes that carry them to deferred receivers.
//!
//! - [`Event`]: one send to a target [`Address`], positional [`Args`], optional delay.
//! - [`PendingEventPool`] / [`PendingEvent`]: recyclable envelopes used by the
//!   main-thread, background and async strategies.

mod event;
mod pending;

pub(crate) use event::receiver_key;
pub use event::{Address, Args, Event};
pub use pending::{PendingEvent, PendingEventPool};
