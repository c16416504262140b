//! # Signal bus: subscribe, unsubscribe, send.
//!
//! [`SignalBus`] ties the pieces together:
//! - [`DescriptorCache`] discovers receivers of a subscriber type;
//! - the registry maps `"Type#method"` to live registrations;
//! - the send loop drains a per-thread FIFO, routing each event by the
//!   receiver's [`ThreadMode`];
//! - the three [`DeliveryStrategy`]s run deferred receivers.
//!
//! ## Routing
//! ```text
//! dispatch_one(event)
//!     ├─ no registration          ─► info log, skip
//!     ├─ arg count != param count ─► Err(ParamMismatch), drain aborted
//!     └─ by mode:
//!          Posting    ─► delayed? Err(DelayUnsupported) : invoke inline
//!          Main       ─► on UI thread? invoke inline : MainThreadStrategy
//!          Background ─► BackgroundStrategy
//!          Async      ─► AsyncStrategy
//! ```

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::error::SignalError;
use crate::events::{Address, Args, Event, PendingEventPool};
use crate::strategies::DeliveryStrategy;
use crate::subscribers::{DescriptorCache, ReceiverDescriptor, Subscriber, ThreadMode};
use crate::ui::UiDispatcher;

use super::builder::SignalBusBuilder;
use super::config::Config;
use super::invoke::invoke;
use super::registry::{Registration, Registry};
use super::sending::{self, DrainGuard};

/// Process-wide bus, built on first use.
static GLOBAL: OnceCell<SignalBus> = OnceCell::new();

/// In-process publish/dispatch bus.
pub struct SignalBus {
    pub(super) id: u64,
    pub(super) cfg: Config,
    pub(super) descriptors: DescriptorCache,
    pub(super) registry: Registry,
    pub(super) pool: Arc<PendingEventPool>,
    pub(super) dispatcher: Arc<dyn UiDispatcher>,
    pub(super) main: Box<dyn DeliveryStrategy>,
    pub(super) background: Box<dyn DeliveryStrategy>,
    pub(super) asynchronous: Box<dyn DeliveryStrategy>,
}

impl SignalBus {
    /// Starts building a bus from `cfg`.
    pub fn builder(cfg: Config) -> SignalBusBuilder {
        SignalBusBuilder::new(cfg)
    }

    /// Bus with the given config, self-describing subscribers and a built-in UI thread.
    pub fn new(cfg: Config) -> Result<Self, SignalError> {
        SignalBusBuilder::new(cfg).build()
    }

    /// Process-wide bus with [`Config::default`], created by the first call.
    ///
    /// Isolated instances from [`SignalBus::new`] never share state with it.
    pub fn global() -> Result<&'static SignalBus, SignalError> {
        GLOBAL.get_or_try_init(|| SignalBus::new(Config::default()))
    }

    /// Registers every receiver of `target`.
    ///
    /// Rejected as a whole if any receiver of the same type is already registered.
    pub fn subscribe(&self, target: Arc<dyn Subscriber>) -> Result<(), SignalError> {
        let receivers = self.receivers(target.as_ref())?;
        self.registry
            .register(&target, &receivers)
            .inspect(|_| {
                tracing::debug!(subscriber = target.type_name(), receivers = receivers.len(), "subscribed");
            })
            .inspect_err(|err| tracing::warn!(error = %err, "subscribe rejected"))
    }

    /// Removes `target`'s receivers, stopping at the first one not registered.
    pub fn unsubscribe(&self, target: &dyn Subscriber) -> Result<(), SignalError> {
        let receivers = self.receivers(target)?;
        self.registry
            .unregister(target, &receivers)
            .inspect(|_| tracing::debug!(subscriber = target.type_name(), "unsubscribed"))
            .inspect_err(|err| tracing::warn!(error = %err, "unsubscribe incomplete"))
    }

    /// Sends `args` to the receiver at `to`.
    ///
    /// Returns once every event queued by this thread's drain has been
    /// delivered inline or handed to its strategy. Called from inside a
    /// handler, it only queues and returns `Ok`.
    pub fn send(&self, to: &Address, args: Args) -> Result<(), SignalError> {
        self.send_event(Event::new(to.clone(), args))
    }

    /// Sends `args` to the receiver at `to` after `delay`.
    ///
    /// Honored by background and async receivers, ignored by main-thread
    /// hand-off, rejected by posting receivers.
    pub fn send_delayed(&self, to: &Address, delay: Duration, args: Args) -> Result<(), SignalError> {
        self.send_event(Event::delayed(to.clone(), delay, args))
    }

    /// Receivers of `target` as discovered by the provider chain.
    pub fn receivers_of(&self, target: &dyn Subscriber) -> Option<Arc<[ReceiverDescriptor]>> {
        self.descriptors.describe(target)
    }

    /// True if a receiver is registered at `to`.
    pub fn is_registered(&self, to: &Address) -> bool {
        self.registry.lookup(&to.key()).is_some()
    }

    /// Registered keys (`"Type#method"`), sorted.
    pub fn registered_keys(&self) -> Vec<String> {
        self.registry.keys()
    }

    /// Number of registered receivers.
    pub fn registered_len(&self) -> usize {
        self.registry.len()
    }

    /// Envelope pool shared by the deferred strategies.
    pub fn pool(&self) -> &Arc<PendingEventPool> {
        &self.pool
    }

    /// Configuration this bus was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn receivers(&self, target: &dyn Subscriber) -> Result<Arc<[ReceiverDescriptor]>, SignalError> {
        self.descriptors.describe(target).ok_or_else(|| {
            let err = SignalError::NoReceivers {
                type_name: target.type_name(),
            };
            tracing::info!(error = %err, "can not register");
            err
        })
    }

    fn send_event(&self, event: Event) -> Result<(), SignalError> {
        let Some(drain) = sending::enqueue(self.id, event, || self.dispatcher.is_current_thread_ui()) else {
            return Ok(());
        };
        self.drain(&drain)
    }

    fn drain(&self, drain: &DrainGuard) -> Result<(), SignalError> {
        let on_ui_thread = drain.on_ui_thread();
        while let Some(event) = drain.next() {
            self.dispatch_one(event, on_ui_thread)?;
        }
        Ok(())
    }

    fn dispatch_one(&self, event: Event, on_ui_thread: bool) -> Result<(), SignalError> {
        let key = event.target().key();
        let Some(registration) = self.registry.lookup(&key) else {
            tracing::info!(%key, "no subscriber registered");
            return Ok(());
        };

        let expected = registration.descriptor().params().len();
        let found = event.args().len();
        if expected != found {
            return Err(SignalError::ParamMismatch { key, expected, found });
        }

        self.route(registration, event, on_ui_thread)
    }

    fn route(&self, registration: Arc<Registration>, event: Event, on_ui_thread: bool) -> Result<(), SignalError> {
        match registration.descriptor().mode() {
            ThreadMode::Posting => match event.delay() {
                Some(delay) => Err(SignalError::DelayUnsupported {
                    key: registration.key().to_string(),
                    delay,
                }),
                None => invoke(&registration, event.args()),
            },
            ThreadMode::Main if on_ui_thread => invoke(&registration, event.args()),
            ThreadMode::Main => self.hand_off(self.main.as_ref(), event, registration),
            ThreadMode::Background => self.hand_off(self.background.as_ref(), event, registration),
            ThreadMode::Async => self.hand_off(self.asynchronous.as_ref(), event, registration),
        }
    }

    fn hand_off(
        &self,
        strategy: &dyn DeliveryStrategy,
        event: Event,
        registration: Arc<Registration>,
    ) -> Result<(), SignalError> {
        tracing::debug!(key = registration.key(), strategy = strategy.name(), delay = ?event.delay(), "handed off");
        strategy.accept(event, registration);
        Ok(())
    }
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBus")
            .field("id", &self.id)
            .field("registered", &self.registry.len())
            .field("pool_available", &self.pool.available())
            .finish()
    }
}
