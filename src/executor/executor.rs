use std::sync::Arc;
use std::time::Duration;

use crate::error::ExecutorError;
use crate::processing::ProcessingHost;

/// Runs processing hosts with bounded concurrency.
///
/// The contract mirrors a classic thread pool: `execute` may reject, an
/// orderly `shutdown` lets queued work finish, and `shutdown_now` hands back
/// the tasks that never started so their items can be reset.
pub trait OutboxExecutor: Send + Sync {
    fn execute(&self, host: Arc<ProcessingHost>) -> Result<(), ExecutorError>;

    /// Stop accepting tasks; queued and running tasks still complete.
    fn shutdown(&self) -> Result<(), ExecutorError>;

    /// Wait until every task has finished after a shutdown.
    /// Returns `Ok(false)` if the timeout elapsed first.
    fn await_termination(&self, timeout: Duration) -> Result<bool, ExecutorError>;

    /// Stop accepting tasks and drain the queue, returning the tasks that
    /// were never started. Running tasks are left to finish.
    fn shutdown_now(&self) -> Result<Vec<Arc<ProcessingHost>>, ExecutorError>;
}
