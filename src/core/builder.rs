use std::sync::Arc;

use crate::core::Config;
use crate::error::SignalError;
use crate::events::PendingEventPool;
use crate::strategies::{AsyncStrategy, BackgroundStrategy, MainThreadStrategy};
use crate::subscribers::{DescriptorCache, DescriptorProvider, SelfDescribing, StaticIndex};
use crate::ui::{ThreadDispatcher, UiDispatcher};

use super::bus::SignalBus;
use super::registry::Registry;
use super::sending::next_bus_id;

/// Builder for constructing a [`SignalBus`] with optional collaborators.
pub struct SignalBusBuilder {
    cfg: Config,
    index: StaticIndex,
    providers: Vec<Arc<dyn DescriptorProvider>>,
    dispatcher: Option<Arc<dyn UiDispatcher>>,
}

impl SignalBusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            index: StaticIndex::new(),
            providers: Vec::new(),
            dispatcher: None,
        }
    }

    /// Sets the precomputed receiver table consulted before anything else.
    pub fn with_index(mut self, index: StaticIndex) -> Self {
        self.index = index;
        self
    }

    /// Adds a provider consulted after the static index and before self-description.
    pub fn with_provider(mut self, provider: Arc<dyn DescriptorProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Uses the host's UI dispatcher for main-mode receivers.
    ///
    /// Without one, `build` spawns a [`ThreadDispatcher`] named
    /// [`Config::main_thread_name`].
    pub fn with_ui_dispatcher(mut self, dispatcher: Arc<dyn UiDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Builds the bus and starts its workers:
    /// - envelope pool with `cfg.pool_capacity` slots
    /// - provider chain: static index → extra providers → self-description
    /// - UI dispatcher (host or built-in)
    /// - background worker thread and async pool
    pub fn build(self) -> Result<SignalBus, SignalError> {
        let pool = PendingEventPool::new(self.cfg.pool_capacity);

        let mut providers: Vec<Arc<dyn DescriptorProvider>> = Vec::with_capacity(self.providers.len() + 2);
        providers.push(Arc::new(self.index));
        providers.extend(self.providers);
        providers.push(Arc::new(SelfDescribing));

        let dispatcher: Arc<dyn UiDispatcher> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(ThreadDispatcher::spawn(&self.cfg.main_thread_name)?),
        };

        let main = MainThreadStrategy::new(Arc::clone(&pool), Arc::clone(&dispatcher));
        let background = BackgroundStrategy::spawn(Arc::clone(&pool), &self.cfg.background_thread_name)?;
        let asynchronous = AsyncStrategy::new(Arc::clone(&pool), &self.cfg)?;

        let bus = SignalBus {
            id: next_bus_id(),
            descriptors: DescriptorCache::new(providers),
            registry: Registry::new(),
            pool,
            dispatcher,
            main: Box::new(main),
            background: Box::new(background),
            asynchronous: Box::new(asynchronous),
            cfg: self.cfg,
        };
        tracing::debug!(bus = bus.id, pool_capacity = bus.cfg.pool_capacity, "signal bus started");
        Ok(bus)
    }
}
