//! # Handler invocation boundary.
//!
//! Every delivery path ends in [`invoke`]. Outcomes:
//!
//! ```text
//! on_signal(method, args)
//!     ├─ Ok                         ─► delivered
//!     ├─ Err(Fail) / panic          ─► logged, bus keeps running   (subscriber fault)
//!     └─ Err(UnknownMethod | Arg..) ─► SignalError::Unreachable    (internal fault)
//! ```
//!
//! **Warning**: `AssertUnwindSafe` is used, so a subscriber that panics while
//! holding its own lock may leave that state poisoned.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::SignalError;
use crate::events::Args;

use super::Registration;

/// Calls the registered receiver with `args`.
pub(crate) fn invoke(registration: &Registration, args: &Args) -> Result<(), SignalError> {
    let method = registration.descriptor().method();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        registration.target().on_signal(method, args)
    }));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) if err.is_handler_fault() => {
            tracing::warn!(key = registration.key(), error = %err, "receiver failed");
            Ok(())
        }
        Ok(Err(err)) => Err(SignalError::Unreachable {
            key: registration.key().to_string(),
            source: err,
        }),
        Err(panic_err) => {
            tracing::error!(
                key = registration.key(),
                panic = %panic_message(panic_err.as_ref()),
                "receiver panicked"
            );
            Ok(())
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
