use std::sync::atomic::Ordering;
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;

use transactional_outbox::{
    ExecutorError, OutboxConfig, OutboxError, OutboxExecutor, OutboxStatus, ProcessingHost,
    WorkerPool,
};

use crate::support::{wait_until, CountingExecutor, Harness, HoldingExecutor};

fn single_worker() -> OutboxConfig {
    OutboxConfig {
        thread_pool_size: 1,
        thread_name_prefix: "shutdown-test".to_string(),
        thread_pool_timeout: Duration::from_millis(200),
        ..OutboxConfig::default()
    }
}

#[test]
fn queued_group_reverts_to_pending_when_drain_times_out() {
    let h = Harness::with(|builder| builder.with_config(single_worker()).without_grouping());
    let (release, blocked) = channel();
    h.handler.block_on("A", blocked);
    let a = h.add("A");
    let b = h.add("B");

    let report = h.outbox.monitor();
    assert_eq!(report.submitted_groups, 2);
    assert!(wait_until(Duration::from_secs(2), || h.handler.handled().len() == 1));

    h.outbox.shutdown().unwrap();

    let queued = h.store.item(b.id);
    assert_eq!(queued.status, OutboxStatus::Pending);
    assert_eq!(queued.rerun_after, None);
    assert_eq!(h.handler.handled(), vec!["A"]);

    release.send(()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || {
        h.store.item(a.id).status == OutboxStatus::Completed
    }));
    assert_eq!(h.handler.handled(), vec!["A"]);
}

#[test]
fn orderly_shutdown_lets_queued_groups_finish() {
    let h = Harness::with(|builder| {
        builder
            .with_config(OutboxConfig {
                thread_pool_timeout: Duration::from_secs(5),
                ..single_worker()
            })
            .without_grouping()
    });
    let a = h.add("A");
    let b = h.add("B");

    h.outbox.monitor();
    h.outbox.shutdown().unwrap();

    assert_eq!(h.store.item(a.id).status, OutboxStatus::Completed);
    assert_eq!(h.store.item(b.id).status, OutboxStatus::Completed);
}

#[test]
fn second_shutdown_does_not_drain_again() {
    let pool: Arc<dyn OutboxExecutor> = Arc::new(WorkerPool::new(1, "shutdown-twice", None).unwrap());
    let executor = CountingExecutor::new(pool);
    let counted = Arc::clone(&executor);
    let h = Harness::with(move |builder| builder.with_executor(counted));

    h.outbox.shutdown().unwrap();
    h.outbox.shutdown().unwrap();

    assert!(h.outbox.is_shutting_down());
    assert_eq!(executor.shutdowns.load(Ordering::SeqCst), 1);
    assert_eq!(executor.shutdown_nows.load(Ordering::SeqCst), 0);
}

/// Holds hosts and fails while waiting for termination.
#[derive(Default)]
struct BrokenWaitExecutor {
    held: HoldingExecutor,
}

impl OutboxExecutor for BrokenWaitExecutor {
    fn execute(&self, host: Arc<ProcessingHost>) -> Result<(), ExecutorError> {
        self.held.execute(host)
    }

    fn shutdown(&self) -> Result<(), ExecutorError> {
        Ok(())
    }

    fn await_termination(&self, _timeout: Duration) -> Result<bool, ExecutorError> {
        Err(ExecutorError::Poisoned("await_termination"))
    }

    fn shutdown_now(&self) -> Result<Vec<Arc<ProcessingHost>>, ExecutorError> {
        self.held.shutdown_now()
    }
}

#[test]
fn wait_failure_still_resets_queued_groups_and_is_returned() {
    let h = Harness::with(|builder| builder.with_executor(Arc::new(BrokenWaitExecutor::default())));
    let item = h.add("A");
    h.outbox.monitor();
    assert_eq!(h.store.item(item.id).status, OutboxStatus::Running);

    let err = h.outbox.shutdown().unwrap_err();

    assert!(matches!(
        err,
        OutboxError::Executor(ExecutorError::Poisoned("await_termination"))
    ));
    assert_eq!(h.store.item(item.id).status, OutboxStatus::Pending);
    assert!(h.handler.handled().is_empty());
}

#[test]
fn monitor_after_shutdown_submits_nothing() {
    let h = Harness::with(|builder| builder.with_config(single_worker()));
    h.outbox.shutdown().unwrap();
    let item = h.add("A");

    assert_eq!(h.outbox.monitor().submitted_groups, 0);
    assert!(h.store.item(item.id).is_pending());
}
