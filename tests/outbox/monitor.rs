use std::sync::Arc;
use std::time::Duration;

use transactional_outbox::{MonitorReport, OutboxItem, OutboxStatus, OutboxStore};

use crate::support::{epoch, Harness, HoldingExecutor, RejectingExecutor, ITEM_TYPE};

fn hours(h: i64) -> chrono::Duration {
    chrono::Duration::hours(h)
}

#[test]
fn claim_persists_running_state_before_execution() {
    let executor = Arc::new(HoldingExecutor::default());
    let held = Arc::clone(&executor);
    let h = Harness::with(move |builder| builder.with_executor(held));
    let item = h.add("A");

    let report = h.outbox.monitor();

    assert_eq!(report.claimed, 1);
    assert_eq!(report.submitted_groups, 1);
    let stored = h.store.item(item.id);
    assert_eq!(stored.status, OutboxStatus::Running);
    assert_eq!(stored.last_execution, Some(epoch()));
    assert_eq!(stored.rerun_after, Some(epoch() + hours(1)));
    assert!(h.handler.handled().is_empty());

    executor.run_all();

    let stored = h.store.item(item.id);
    assert_eq!(stored.status, OutboxStatus::Completed);
    assert_eq!(stored.delete_after, Some(epoch() + chrono::Duration::seconds(60)));
    assert_eq!(h.handler.handled(), vec!["A"]);
}

#[test]
fn claimed_item_is_not_claimed_again_while_in_flight() {
    let executor = Arc::new(HoldingExecutor::default());
    let held = Arc::clone(&executor);
    let h = Harness::with(move |builder| builder.with_executor(held));
    h.add("A");

    assert_eq!(h.outbox.monitor().claimed, 1);
    h.advance(Duration::from_secs(30));
    let second = h.outbox.monitor();

    assert_eq!(second.claimed, 0);
    assert_eq!(executor.held(), 1);
}

#[test]
fn stale_running_item_is_reclaimed() {
    let h = Harness::new();
    let mut item = OutboxItem::new(ITEM_TYPE.into(), "A", epoch() - hours(2), None);
    item.status = OutboxStatus::Running;
    item.last_execution = Some(epoch() - hours(2));
    item.rerun_after = Some(epoch() - chrono::Duration::seconds(1));
    let item = h.store.inner.insert(item).unwrap();

    let report = h.outbox.monitor();

    assert_eq!(report.claimed, 1);
    assert_eq!(h.handler.handled(), vec!["A"]);
    assert_eq!(h.store.item(item.id).status, OutboxStatus::Completed);
}

#[test]
fn running_item_inside_staleness_window_is_left_alone() {
    let h = Harness::new();
    let mut item = OutboxItem::new(ITEM_TYPE.into(), "A", epoch() - hours(2), None);
    item.status = OutboxStatus::Running;
    item.rerun_after = Some(epoch() + chrono::Duration::seconds(10));
    let item = h.store.inner.insert(item).unwrap();

    let report = h.outbox.monitor();

    assert_eq!(report, MonitorReport::default());
    assert_eq!(h.store.item(item.id).status, OutboxStatus::Running);
}

#[test]
fn pending_item_runs_only_once_due() {
    let h = Harness::new();
    let item = OutboxItem::new(ITEM_TYPE.into(), "later", epoch(), None);
    let item = h.store.inner.insert(item).unwrap();

    assert_eq!(h.outbox.monitor().claimed, 0);
    assert!(h.store.item(item.id).is_pending());

    h.advance(Duration::from_millis(1));
    assert_eq!(h.outbox.monitor().claimed, 1);
    assert_eq!(h.handler.handled(), vec!["later"]);
}

#[test]
fn monitor_item_processes_only_that_item() {
    let h = Harness::new();
    let first = h.add("A");
    let second = h.add("B");

    let report = h.outbox.monitor_item(first.id.unwrap());

    assert_eq!(report.claimed, 1);
    assert_eq!(h.handler.handled(), vec!["A"]);
    assert!(h.store.item(second.id).is_pending());
}

#[test]
fn erroneously_fetched_items_are_ignored() {
    let h = Harness::new();
    let mut done = h.store.inner.insert(OutboxItem::new(ITEM_TYPE.into(), "done", epoch(), None)).unwrap();
    done.status = OutboxStatus::Completed;
    h.store.inner.update(&done).unwrap();
    h.store.also_return(done.clone());

    let report = h.outbox.monitor();

    assert_eq!(report.fetched, 1);
    assert_eq!(report.claimed, 0);
    assert_eq!(report.submitted_groups, 0);
    assert!(h.handler.handled().is_empty());
    assert_eq!(h.store.item(done.id).status, OutboxStatus::Completed);
}

#[test]
fn rejected_group_is_reset_to_pending() {
    let h = Harness::with(|builder| builder.with_executor(Arc::new(RejectingExecutor)));
    let item = h.add("A");

    let report = h.outbox.monitor();

    assert_eq!(report.claimed, 1);
    assert_eq!(report.submitted_groups, 0);
    assert_eq!(report.rejected_groups, 1);
    let stored = h.store.item(item.id);
    assert_eq!(stored.status, OutboxStatus::Pending);
    assert_eq!(stored.rerun_after, None);
    assert!(h.handler.handled().is_empty());
}

#[test]
fn item_whose_claim_cannot_be_persisted_does_not_run() {
    let h = Harness::new();
    let item = h.add("A");
    h.store.fail_update(true);

    let report = h.outbox.monitor();

    assert_eq!(report.claimed, 0);
    assert!(h.handler.handled().is_empty());
    assert!(h.store.item(item.id).is_pending());

    h.store.fail_update(false);
    assert_eq!(h.outbox.monitor().claimed, 1);
    assert_eq!(h.handler.handled(), vec!["A"]);
}

#[test]
fn monitor_is_a_no_op_after_shutdown() {
    let h = Harness::new();
    h.outbox.shutdown().unwrap();
    let item = h.add("A");

    let report = h.outbox.monitor();

    assert_eq!(report, MonitorReport::default());
    assert_eq!(h.monitor_locks.acquires(), 0);
    assert_eq!(h.store.fetches(), 0);
    assert!(h.store.item(item.id).is_pending());
}
