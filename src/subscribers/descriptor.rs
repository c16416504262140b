use std::borrow::Cow;
use std::fmt;

/// Which thread runs a receiver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ThreadMode {
    /// Synchronously on the sending thread, inside its drain loop.
    #[default]
    Posting,
    /// On the UI thread: inline when already there, otherwise via the UI dispatcher.
    Main,
    /// On the single background worker, in global FIFO order.
    Background,
    /// On the elastic worker pool, one task per event, unordered.
    Async,
}

impl ThreadMode {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ThreadMode::Posting => "posting",
            ThreadMode::Main => "main",
            ThreadMode::Background => "background",
            ThreadMode::Async => "async",
        }
    }
}

impl fmt::Display for ThreadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Declared type of one receiver parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamType {
    name: &'static str,
}

impl ParamType {
    /// Type tag for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
        }
    }

    /// Rust type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// One receiver method of a subscriber type.
///
/// # Example
/// ```
/// use signalbus::{ReceiverDescriptor, ThreadMode};
///
/// let d = ReceiverDescriptor::new("on_score", ThreadMode::Background)
///     .param::<u32>()
///     .param::<String>();
///
/// assert_eq!(d.method(), "on_score");
/// assert_eq!(d.params().len(), 2);
/// assert_eq!(d.mode(), ThreadMode::Background);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiverDescriptor {
    method: Cow<'static, str>,
    params: Vec<ParamType>,
    mode: ThreadMode,
}

impl ReceiverDescriptor {
    /// Receiver with no parameters.
    pub fn new(method: impl Into<Cow<'static, str>>, mode: ThreadMode) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
            mode,
        }
    }

    /// Appends a parameter of type `T`.
    #[must_use]
    pub fn param<T: ?Sized + 'static>(mut self) -> Self {
        self.params.push(ParamType::of::<T>());
        self
    }

    /// Method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Declared parameters, in order.
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Thread affinity.
    pub fn mode(&self) -> ThreadMode {
        self.mode
    }
}

impl fmt::Display for ReceiverDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p.name())?;
        }
        write!(f, ") [{}]", self.mode)
    }
}
