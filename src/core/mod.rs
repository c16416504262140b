//! Dispatch core: the bus, its registry and the per-thread send loop.
//!
//! The only public API from this module is [`SignalBus`] (plus its builder,
//! [`Config`] and [`Registration`]).
//!
//! Internal modules:
//! - [`bus`]: subscribe/unsubscribe/send, drain loop and routing by thread mode;
//! - [`builder`]: wires pool, providers, UI dispatcher and workers;
//! - [`registry`]: key → registration table;
//! - [`sending`]: per-calling-thread queue and drain guard;
//! - [`invoke`]: the handler invocation boundary.

mod builder;
mod bus;
mod config;
mod invoke;
mod registry;
mod sending;

pub use builder::SignalBusBuilder;
pub use bus::SignalBus;
pub use config::Config;
pub use registry::Registration;

pub(crate) use invoke::{invoke, panic_message};

#[cfg(test)]
mod tests;
