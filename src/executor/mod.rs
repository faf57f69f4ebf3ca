//! Concurrency substrate running processing hosts.
//!
//! - `OutboxExecutor` - Contract for pluggable executors
//! - `WorkerPool` - Fixed pool of named threads over a bounded queue

#[allow(clippy::module_inception)]
mod executor;
mod pool;

pub use executor::OutboxExecutor;
pub use pool::WorkerPool;
