//! # signalbus
//!
//! **signalbus** is an in-process publish/dispatch bus with per-receiver
//! thread affinity.
//!
//! Callers send a signal addressed to a (subscriber type, method) pair. The
//! registered receiver runs on the thread its [`ThreadMode`] asks for: the
//! sending thread, the UI thread, a single background worker, or an elastic
//! worker pool.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   thread A: send(addr, args)        thread B: send(addr, args)
//!        │                                 │
//!        ▼                                 ▼
//! ┌──────────────────────┐       ┌──────────────────────┐
//! │ SendingThreadState A │       │ SendingThreadState B │
//! │ FIFO + draining flag │       │ FIFO + draining flag │
//! └──────────┬───────────┘       └──────────┬───────────┘
//!            └───────────────┬──────────────┘
//!                            ▼
//!                ┌───────────────────────┐      subscribe / unsubscribe
//!                │ Registry "Type#method"│ ◄──── (writer lock) ◄── DescriptorCache
//!                └───────────┬───────────┘                          │
//!                            ▼                          StaticIndex ─┴─ SelfDescribing
//!          ┌─────────────┬───┴─────────┬──────────────┐
//!          ▼             ▼             ▼              ▼
//!       Posting        Main        Background       Async
//!       (inline)   (inline on UI   (1 thread,     (thread pool,
//!                   else hand-off)  global FIFO)   unordered)
//!                        │             │              │
//!                        └─────► PendingEventPool ◄───┘
//!                                (recycled envelopes)
//! ```
//!
//! ### Send loop
//! ```text
//! send(A)
//!   ├─► enqueue A on this thread's FIFO
//!   ├─► already draining? ── yes ─► return Ok (outer drain delivers it)
//!   └─► drain:
//!         loop {
//!           ├─► pop front
//!           ├─► lookup registration (none → log, skip)
//!           ├─► arg count check (mismatch → Err, drain aborted)
//!           └─► route by ThreadMode (handler may send(B) → appended)
//!         }
//!       reset flags on every exit path
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types / traits                       |
//! |-------------------|---------------------------------------------------------|------------------------------------------|
//! | **Bus**           | Subscribe, unsubscribe, send, delayed send.             | [`SignalBus`], [`Address`], [`Args`]     |
//! | **Subscribers**   | Invocation boundary and receiver metadata.              | [`Subscriber`], [`ReceiverDescriptor`]   |
//! | **Discovery**     | Static index first, self-description fallback, memoized.| [`DescriptorProvider`], [`StaticIndex`]  |
//! | **Strategies**    | Main-thread, background and async delivery.             | [`DeliveryStrategy`]                     |
//! | **UI hand-off**   | Host UI loop or the built-in UI thread.                 | [`UiDispatcher`], [`ThreadDispatcher`]   |
//! | **Errors**        | Typed bus and handler errors.                           | [`SignalError`], [`HandlerError`]        |
//! | **Configuration** | Pool size and worker settings.                          | [`Config`]                               |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use signalbus::{args, Address, Args, Config, HandlerError, ReceiverDescriptor, SignalBus, Subscriber, ThreadMode};
//!
//! #[derive(Default)]
//! struct Score {
//!     total: AtomicU32,
//! }
//!
//! impl Subscriber for Score {
//!     fn receivers(&self) -> Option<Vec<ReceiverDescriptor>> {
//!         Some(vec![ReceiverDescriptor::new("add", ThreadMode::Posting).param::<u32>()])
//!     }
//!
//!     fn on_signal(&self, method: &str, args: &Args) -> Result<(), HandlerError> {
//!         match method {
//!             "add" => {
//!                 self.total.fetch_add(*args.get::<u32>(0)?, Ordering::SeqCst);
//!                 Ok(())
//!             }
//!             other => Err(HandlerError::unknown(other)),
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), signalbus::SignalError> {
//!     let bus = SignalBus::new(Config::default())?;
//!     let score = Arc::new(Score::default());
//!     bus.subscribe(score.clone())?;
//!
//!     bus.send(&Address::of::<Score>("add"), args![5u32])?;
//!     assert_eq!(score.total.load(Ordering::SeqCst), 5);
//!
//!     bus.unsubscribe(score.as_ref())?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod strategies;
mod subscribers;
mod ui;

// ---- Public re-exports ----

pub use core::{Config, Registration, SignalBus, SignalBusBuilder};
pub use error::{HandlerError, SignalError};
pub use events::{Address, Args, Event, PendingEvent, PendingEventPool};
pub use strategies::{AsyncStrategy, BackgroundStrategy, DeliveryStrategy, MainThreadStrategy};
pub use subscribers::{
    DescriptorCache, DescriptorProvider, ParamType, ReceiverDescriptor, SelfDescribing,
    StaticIndex, Subscriber, ThreadMode,
};
pub use ui::{ThreadDispatcher, UiDispatcher, UiTask};
