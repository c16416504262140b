//! # Events sent through the bus.
//!
//! An [`Event`] is created by [`SignalBus::send`](crate::SignalBus::send) and
//! is read-only afterwards. It names its receiver by [`Address`] (subscriber
//! type + method) and carries positional [`Args`].
//!
//! ## Example
//! ```rust
//! use signalbus::{Address, Args};
//!
//! struct Player;
//!
//! let to = Address::of::<Player>("on_score");
//! let args = Args::new().with(3u32).with(String::from("bonus"));
//!
//! assert_eq!(to.method(), "on_score");
//! assert_eq!(args.len(), 2);
//! assert_eq!(args.get::<u32>(0), Ok(&3));
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use crate::error::HandlerError;

/// Builds the registry key for a (type, method) pair.
pub(crate) fn receiver_key(type_name: &str, method: &str) -> String {
    let mut key = String::with_capacity(type_name.len() + method.len() + 1);
    key.push_str(type_name);
    key.push('#');
    key.push_str(method);
    key
}

/// Target of a send: the subscriber's runtime type and the receiver method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    type_name: &'static str,
    method: Cow<'static, str>,
}

impl Address {
    /// Addresses `method` on subscribers of type `T`.
    pub fn of<T: ?Sized + 'static>(method: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            method: method.into(),
        }
    }

    /// Addresses a receiver by explicit type name.
    ///
    /// `type_name` must match what [`Subscriber::type_name`](crate::Subscriber::type_name)
    /// returns for the target.
    pub fn from_parts(type_name: &'static str, method: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name,
            method: method.into(),
        }
    }

    /// Subscriber type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Receiver method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Registry key of this address.
    pub fn key(&self) -> String {
        receiver_key(self.type_name, &self.method)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.type_name, self.method)
    }
}

/// Positional, type-erased argument list.
#[derive(Default)]
pub struct Args {
    values: Vec<Box<dyn Any + Send>>,
}

impl Args {
    /// Empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one argument.
    #[must_use]
    pub fn with<T: Any + Send>(mut self, value: T) -> Self {
        self.values.push(Box::new(value));
        self
    }

    /// Appends one argument in place.
    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.values.push(Box::new(value));
    }

    /// Borrows argument `index` as `T`.
    ///
    /// Missing or differently typed arguments yield [`HandlerError::ArgumentType`].
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, HandlerError> {
        self.values
            .get(index)
            .and_then(|value| value.downcast_ref::<T>())
            .ok_or(HandlerError::ArgumentType {
                index,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args").field("len", &self.values.len()).finish()
    }
}

/// Builds [`Args`] from a list of values.
///
/// ```rust
/// let args = signalbus::args![1u8, "two", 3.0f64];
/// assert_eq!(args.len(), 3);
/// assert_eq!(args.get::<&str>(1), Ok(&"two"));
/// ```
#[macro_export]
macro_rules! args {
    () => { $crate::Args::new() };
    ($($value:expr),+ $(,)?) => {{
        let mut args = $crate::Args::new();
        $( args.push($value); )+
        args
    }};
}

/// One outgoing signal.
#[derive(Debug)]
pub struct Event {
    target: Address,
    args: Args,
    delay: Option<Duration>,
}

impl Event {
    /// Immediate event.
    pub fn new(target: Address, args: Args) -> Self {
        Self {
            target,
            args,
            delay: None,
        }
    }

    /// Delayed event. A zero delay still counts as a delayed send.
    pub fn delayed(target: Address, delay: Duration, args: Args) -> Self {
        Self {
            target,
            args,
            delay: Some(delay),
        }
    }

    /// Receiver address.
    pub fn target(&self) -> &Address {
        &self.target
    }

    /// Arguments.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Requested delay, if this came from a delayed send.
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Time to wait before invoking on deferred paths.
    pub fn wait(&self) -> Duration {
        self.delay.unwrap_or(Duration::ZERO)
    }
}
