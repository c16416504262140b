use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, ThreadId};

use tokio::sync::mpsc;

use crate::core::panic_message;
use crate::error::SignalError;

use super::{UiDispatcher, UiTask};

/// Dedicated thread acting as the UI thread.
///
/// Tasks run one at a time in scheduling order. A panicking task is logged and
/// the loop keeps going. The thread exits once the dispatcher is dropped and
/// its queue is drained.
pub struct ThreadDispatcher {
    tx: mpsc::UnboundedSender<UiTask>,
    thread: ThreadId,
}

impl ThreadDispatcher {
    /// Spawns the loop thread under `name`.
    pub fn spawn(name: &str) -> Result<Self, SignalError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<UiTask>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Some(task) = rx.blocking_recv() {
                    if let Err(panic_err) = panic::catch_unwind(AssertUnwindSafe(task)) {
                        tracing::error!(panic = %panic_message(panic_err.as_ref()), "ui task panicked");
                    }
                }
            })
            .map_err(|source| SignalError::Spawn {
                worker: "ui dispatcher",
                source,
            })?;

        Ok(Self {
            tx,
            thread: handle.thread().id(),
        })
    }

    /// Id of the loop thread.
    pub fn thread_id(&self) -> ThreadId {
        self.thread
    }
}

impl UiDispatcher for ThreadDispatcher {
    fn schedule(&self, task: UiTask) {
        if self.tx.send(task).is_err() {
            tracing::error!("ui dispatcher thread is gone, task dropped");
        }
    }

    fn is_current_thread_ui(&self) -> bool {
        thread::current().id() == self.thread
    }
}
