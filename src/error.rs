//! Error types used by the signal bus and by subscribers.
//!
//! This module defines two main error enums:
//!
//! - [`SignalError`]: conditions raised by the bus itself (registration,
//!   dispatch, worker startup).
//! - [`HandlerError`]: errors returned by a [`Subscriber`](crate::Subscriber)
//!   from its invocation boundary.
//!
//! Both types provide `as_label` for logging. [`HandlerError::is_handler_fault`]
//! separates failures of the handler body (caught and logged by the bus) from
//! failures to call the handler at all (internal faults).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the signal bus.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SignalError {
    /// No descriptor provider could describe the subscriber.
    #[error("no receivers found for subscriber {type_name}")]
    NoReceivers {
        /// Runtime type name of the subscriber.
        type_name: &'static str,
    },

    /// A receiver of this subscriber type is already registered.
    ///
    /// The whole batch is rejected; existing registrations are left intact.
    #[error("{type_name} has already registered {method}")]
    DuplicateSubscription {
        /// Runtime type name of the subscriber.
        type_name: &'static str,
        /// Receiver method that collided.
        method: String,
    },

    /// Unsubscribe hit a receiver that is not registered.
    ///
    /// Receivers processed before this one stay removed.
    #[error("{type_name} has not registered {method}")]
    NotRegistered {
        /// Runtime type name of the subscriber.
        type_name: &'static str,
        /// Receiver method that was missing.
        method: String,
    },

    /// Argument count of a send does not match the receiver's declared parameters.
    #[error("send param num not match for {key}: expected {expected}, got {found}")]
    ParamMismatch {
        /// Registry key of the receiver.
        key: String,
        /// Declared parameter count.
        expected: usize,
        /// Number of arguments sent.
        found: usize,
    },

    /// A delayed send addressed a posting-thread receiver.
    #[error("delay {delay:?} not supported by posting-thread receiver {key}")]
    DelayUnsupported {
        /// Registry key of the receiver.
        key: String,
        /// Requested delay.
        delay: Duration,
    },

    /// A resolved, arity-matched receiver could not be invoked.
    ///
    /// Indicates the registry and the subscriber disagree about its receivers.
    #[error("cannot invoke {key}: {source}")]
    Unreachable {
        /// Registry key of the receiver.
        key: String,
        /// What the subscriber reported.
        #[source]
        source: HandlerError,
    },

    /// A delivery worker could not be started.
    #[error("failed to start {worker}: {source}")]
    Spawn {
        /// Which worker failed.
        worker: &'static str,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

impl SignalError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use signalbus::SignalError;
    ///
    /// let err = SignalError::NoReceivers { type_name: "demo::Player" };
    /// assert_eq!(err.as_label(), "signal_no_receivers");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SignalError::NoReceivers { .. } => "signal_no_receivers",
            SignalError::DuplicateSubscription { .. } => "signal_duplicate_subscription",
            SignalError::NotRegistered { .. } => "signal_not_registered",
            SignalError::ParamMismatch { .. } => "signal_param_mismatch",
            SignalError::DelayUnsupported { .. } => "signal_delay_unsupported",
            SignalError::Unreachable { .. } => "signal_unreachable",
            SignalError::Spawn { .. } => "signal_spawn_failed",
        }
    }

    /// Registration conditions are reported but leave the bus consistent.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            SignalError::NoReceivers { .. }
                | SignalError::DuplicateSubscription { .. }
                | SignalError::NotRegistered { .. }
        )
    }
}

/// # Errors returned by subscribers.
///
/// Returned from [`Subscriber::on_signal`](crate::Subscriber::on_signal).
/// Only [`HandlerError::Fail`] is a failure of the handler body; the other
/// variants mean the bus asked for something the subscriber cannot do.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler ran and failed.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The subscriber has no receiver with this name.
    #[error("no receiver method named {method}")]
    UnknownMethod {
        /// Requested method name.
        method: String,
    },

    /// An argument is missing or has an unexpected type.
    #[error("argument {index} is not a {expected}")]
    ArgumentType {
        /// Position of the argument.
        index: usize,
        /// Expected Rust type name.
        expected: &'static str,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Fail`].
    pub fn fail(error: impl std::fmt::Display) -> Self {
        HandlerError::Fail {
            error: error.to_string(),
        }
    }

    /// Shorthand for [`HandlerError::UnknownMethod`].
    pub fn unknown(method: &str) -> Self {
        HandlerError::UnknownMethod {
            method: method.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::UnknownMethod { .. } => "handler_unknown_method",
            HandlerError::ArgumentType { .. } => "handler_argument_type",
        }
    }

    /// `true` when the handler body itself failed.
    ///
    /// # Example
    /// ```
    /// use signalbus::HandlerError;
    ///
    /// assert!(HandlerError::fail("boom").is_handler_fault());
    /// assert!(!HandlerError::unknown("on_tick").is_handler_fault());
    /// ```
    pub fn is_handler_fault(&self) -> bool {
        matches!(self, HandlerError::Fail { .. })
    }
}
