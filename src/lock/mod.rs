//! Locks serialising monitor and cleanup cycles across outbox instances.

mod error;
mod in_memory;
mod provider;

pub use error::LockError;
pub use in_memory::{InMemoryLockManager, InMemoryLocksProvider};
pub use provider::OutboxLocksProvider;
