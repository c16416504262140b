//! # Core subscriber trait
//!
//! `Subscriber` is the invocation boundary between the bus and user code. The
//! bus never calls methods by itself: it hands the receiver name and the
//! arguments to [`Subscriber::on_signal`], which matches on the name and calls
//! the real method.
//!
//! ## Contract
//! - Return [`HandlerError::Fail`] (or panic) when the handler body fails; the
//!   bus logs it and keeps running.
//! - Return [`HandlerError::UnknownMethod`] / [`HandlerError::ArgumentType`]
//!   only when the call cannot be made at all; the bus treats that as an
//!   internal fault.
//! - Receivers are found through the [`DescriptorProvider`](super::DescriptorProvider)
//!   chain. Implementing [`Subscriber::receivers`] makes the type self-describing.
//!
//! ## Example
//! ```rust
//! use signalbus::{Args, HandlerError, ReceiverDescriptor, Subscriber, ThreadMode};
//!
//! struct Scoreboard;
//!
//! impl Scoreboard {
//!     fn on_score(&self, points: u32) {
//!         let _ = points;
//!     }
//! }
//!
//! impl Subscriber for Scoreboard {
//!     fn receivers(&self) -> Option<Vec<ReceiverDescriptor>> {
//!         Some(vec![ReceiverDescriptor::new("on_score", ThreadMode::Posting).param::<u32>()])
//!     }
//!
//!     fn on_signal(&self, method: &str, args: &Args) -> Result<(), HandlerError> {
//!         match method {
//!             "on_score" => {
//!                 self.on_score(*args.get::<u32>(0)?);
//!                 Ok(())
//!             }
//!             other => Err(HandlerError::unknown(other)),
//!         }
//!     }
//! }
//! ```

use crate::error::HandlerError;
use crate::events::Args;

use super::ReceiverDescriptor;

/// Contract for signal receivers.
///
/// Called from whichever thread the receiver's [`ThreadMode`](super::ThreadMode)
/// selects, so implementations must be `Send + Sync`.
pub trait Subscriber: Send + Sync + 'static {
    /// Invokes receiver `method` with `args`.
    ///
    /// The argument count has already been checked against the descriptor.
    fn on_signal(&self, method: &str, args: &Args) -> Result<(), HandlerError>;

    /// Runtime type name; part of every registry key for this subscriber.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Self-description used when no static index entry exists.
    ///
    /// `None` means "cannot describe", which is not cached.
    fn receivers(&self) -> Option<Vec<ReceiverDescriptor>> {
        None
    }
}
