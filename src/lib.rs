//! Transactional outbox.
//!
//! Side effects are recorded as outbox items in the same transaction as the
//! business change, then claimed by periodic monitor cycles, grouped,
//! executed on a worker pool with retries, and eventually cleaned up.
//!
//! ## Example
//!
//! ```ignore
//! use transactional_outbox::*;
//!
//! let locks = InMemoryLockManager::new();
//! let store = InMemoryOutboxStore::new();
//! let handler = SimpleOutboxHandler::new("welcome-email", Arc::new(SystemClock), |user: NewUser| {
//!     mailer.send_welcome(&user.email).map_err(|e| HandlerError::failed(e.to_string()))
//! });
//!
//! let outbox = Arc::new(
//!     TransactionalOutboxBuilder::new()
//!         .with_handler(Arc::new(handler))
//!         .with_monitor_locks(locks.provider(1)?)
//!         .with_cleanup_locks(locks.provider(2)?)
//!         .with_store(Arc::new(store.clone()))
//!         .build()?,
//! );
//!
//! outbox.add("welcome-email", &NewUser { email: "ada@example.com".into() })?;
//! let scheduler = OutboxSchedulerThread::spawn(Arc::clone(&outbox), Duration::from_secs(1), None)?;
//! ```

pub mod clock;
pub mod error;
pub mod executor;
pub mod grouping;
pub mod handler;
pub mod instant;
pub mod item;
pub mod lock;
pub mod outbox;
pub mod processing;
pub mod store;
pub mod worker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ExecutorError, HandlerError, OutboxError, StoreError};
pub use executor::{OutboxExecutor, WorkerPool};
pub use grouping::{
    FifoOrderingProvider, GroupIdGroupingProvider, GroupIdProvider, GroupingConfiguration,
    GroupingMode, GroupingProvider, NullGroupIdProvider, OrderingProvider, RandomGroupIdProvider,
    SingleItemGroupingProvider,
};
pub use handler::{HandlerRegistry, OutboxHandler, PayloadCodec, SimpleOutboxHandler};
#[cfg(feature = "emitter")]
pub use instant::EmitterInstantPublisher;
pub use instant::{
    ChannelInstantPublisher, InstantOutboxEvent, InstantOutboxPublisher, NoopInstantPublisher,
};
pub use item::{OutboxItem, OutboxItemFactory, OutboxItemGroup, OutboxPayload, OutboxStatus, OutboxType};
pub use lock::{InMemoryLockManager, InMemoryLocksProvider, LockError, OutboxLocksProvider};
pub use outbox::{MonitorReport, OutboxConfig, TransactionalOutbox, TransactionalOutboxBuilder};
pub use processing::{
    ItemOutcome, OutboxGroupProcessor, OutboxItemProcessor, ProcessingAction, ProcessingHost,
    ProcessorDecorator, ProcessorTask,
};
pub use store::{InMemoryOutboxStore, OutboxFilter, OutboxStore};
pub use worker::{InstantProcessingThread, OutboxSchedulerThread, SchedulerStats};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
