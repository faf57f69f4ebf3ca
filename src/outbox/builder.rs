use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::{OutboxConfig, TransactionalOutbox};
use crate::clock::{Clock, SystemClock};
use crate::error::OutboxError;
use crate::executor::{OutboxExecutor, WorkerPool};
use crate::grouping::{GroupIdProvider, GroupingConfiguration, NullGroupIdProvider};
use crate::handler::{HandlerRegistry, OutboxHandler};
use crate::instant::{InstantOutboxPublisher, NoopInstantPublisher};
use crate::item::OutboxItemFactory;
use crate::lock::OutboxLocksProvider;
use crate::processing::ProcessorDecorator;
use crate::store::OutboxStore;

/// Assembles a [`TransactionalOutbox`].
///
/// Handlers, both lock providers and the store are required; everything
/// else has a default.
///
/// ## Example
///
/// ```ignore
/// let locks = InMemoryLockManager::new();
/// let outbox = TransactionalOutboxBuilder::new()
///     .with_handler(Arc::new(order_handler))
///     .with_monitor_locks(locks.provider(1)?)
///     .with_cleanup_locks(locks.provider(2)?)
///     .with_store(Arc::new(InMemoryOutboxStore::new()))
///     .with_config(OutboxConfig::from_json(&config_json)?)
///     .build()?;
/// ```
#[derive(Default)]
pub struct TransactionalOutboxBuilder {
    handlers: Option<Vec<Arc<dyn OutboxHandler>>>,
    monitor_locks: Option<Arc<dyn OutboxLocksProvider>>,
    cleanup_locks: Option<Arc<dyn OutboxLocksProvider>>,
    store: Option<Arc<dyn OutboxStore>>,
    instant_publisher: Option<Arc<dyn InstantOutboxPublisher>>,
    executor: Option<Arc<dyn OutboxExecutor>>,
    clock: Option<Arc<dyn Clock>>,
    group_id_provider: Option<Arc<dyn GroupIdProvider>>,
    grouping: Option<GroupingConfiguration>,
    decorators: Vec<Arc<dyn ProcessorDecorator>>,
    config: OutboxConfig,
}

impl TransactionalOutboxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handlers(
        mut self,
        handlers: impl IntoIterator<Item = Arc<dyn OutboxHandler>>,
    ) -> Self {
        self.handlers.get_or_insert_with(Vec::new).extend(handlers);
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn OutboxHandler>) -> Self {
        self.handlers.get_or_insert_with(Vec::new).push(handler);
        self
    }

    pub fn with_monitor_locks(mut self, locks: Arc<dyn OutboxLocksProvider>) -> Self {
        self.monitor_locks = Some(locks);
        self
    }

    pub fn with_cleanup_locks(mut self, locks: Arc<dyn OutboxLocksProvider>) -> Self {
        self.cleanup_locks = Some(locks);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn OutboxStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_instant_publisher(mut self, publisher: Arc<dyn InstantOutboxPublisher>) -> Self {
        self.instant_publisher = Some(publisher);
        self
    }

    /// Replace the default [`WorkerPool`]. Pool settings in the config are
    /// then ignored.
    pub fn with_executor(mut self, executor: Arc<dyn OutboxExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_group_id_provider(mut self, provider: Arc<dyn GroupIdProvider>) -> Self {
        self.group_id_provider = Some(provider);
        self
    }

    /// Overrides the `grouping` mode of the config.
    pub fn with_grouping_configuration(mut self, grouping: GroupingConfiguration) -> Self {
        self.grouping = Some(grouping);
        self
    }

    pub fn with_grouping(self) -> Self {
        self.with_grouping_configuration(GroupingConfiguration::Grouped)
    }

    pub fn without_grouping(self) -> Self {
        self.with_grouping_configuration(GroupingConfiguration::Ungrouped)
    }

    pub fn with_decorator(mut self, decorator: Arc<dyn ProcessorDecorator>) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub fn with_config(mut self, config: OutboxConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<TransactionalOutbox, OutboxError> {
        let handlers = self
            .handlers
            .ok_or(OutboxError::MissingConfiguration("handlers"))?;
        let monitor_locks = self
            .monitor_locks
            .ok_or(OutboxError::MissingConfiguration("monitor locks provider"))?;
        let cleanup_locks = self
            .cleanup_locks
            .ok_or(OutboxError::MissingConfiguration("cleanup locks provider"))?;
        let store = self
            .store
            .ok_or(OutboxError::MissingConfiguration("store"))?;
        self.config.validate()?;

        let registry = Arc::new(HandlerRegistry::new(handlers)?);
        let group_id_provider = self
            .group_id_provider
            .unwrap_or_else(|| Arc::new(NullGroupIdProvider));
        let grouping = self
            .grouping
            .unwrap_or_else(|| self.config.grouping.into())
            .grouping_provider();
        let executor: Arc<dyn OutboxExecutor> = match self.executor {
            Some(executor) => executor,
            None => Arc::new(WorkerPool::new(
                self.config.thread_pool_size,
                &self.config.thread_name_prefix,
                self.config.queue_capacity,
            )?),
        };

        Ok(TransactionalOutbox {
            factory: OutboxItemFactory::new(Arc::clone(&registry), group_id_provider),
            registry,
            store,
            monitor_locks,
            cleanup_locks,
            instant_publisher: self
                .instant_publisher
                .unwrap_or_else(|| Arc::new(NoopInstantPublisher)),
            executor,
            grouping,
            decorators: self.decorators,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            rerun_after: self.config.rerun_after,
            thread_pool_timeout: self.config.thread_pool_timeout,
            in_shutdown: AtomicBool::new(false),
        })
    }
}
