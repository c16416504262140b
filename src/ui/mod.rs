//! # UI-thread hand-off.
//!
//! Main-mode receivers run on the host's UI thread. The bus only needs two
//! things from the host, captured by [`UiDispatcher`]:
//! - run a task on the UI thread later ([`UiDispatcher::schedule`]);
//! - tell whether the caller already is the UI thread ([`UiDispatcher::is_current_thread_ui`]).
//!
//! Hosts with their own event loop implement the trait over it. Without one,
//! [`ThreadDispatcher`] runs a dedicated thread that plays the UI thread.

mod looper;

pub use looper::ThreadDispatcher;

/// Unit of work scheduled onto the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Host UI-thread dispatcher consumed by the main-thread strategy.
pub trait UiDispatcher: Send + Sync {
    /// Queues `task` to run on the UI thread.
    fn schedule(&self, task: UiTask);

    /// True when called on the UI thread.
    fn is_current_thread_ui(&self) -> bool;
}
