//! The outbox engine and its construction.
//!
//! - `TransactionalOutbox` - add, monitor, cleanup and shutdown
//! - `TransactionalOutboxBuilder` - Collaborators and validation
//! - `OutboxConfig` - Serializable tunables
//! - `MonitorReport` - Counters of one monitor cycle

mod builder;
mod config;
mod transactional;

pub use builder::TransactionalOutboxBuilder;
pub use config::OutboxConfig;
pub use transactional::{MonitorReport, TransactionalOutbox};
