use std::time::Duration;

use transactional_outbox::{Clock, OutboxItem, OutboxStatus, OutboxStore};

use crate::support::{epoch, Harness, ITEM_TYPE};

fn completed(h: &Harness, delete_after: chrono::DateTime<chrono::Utc>) -> OutboxItem {
    let mut item = h
        .store
        .inner
        .insert(OutboxItem::new(ITEM_TYPE.into(), "done", epoch(), None))
        .unwrap();
    item.status = OutboxStatus::Completed;
    item.delete_after = Some(delete_after);
    h.store.inner.update(&item).unwrap()
}

#[test]
fn deletes_items_due_now_and_keeps_later_ones() {
    let h = Harness::new();
    let now = h.clock.now();
    let due = completed(&h, now);
    let later = completed(&h, now + chrono::Duration::seconds(1));

    assert_eq!(h.outbox.cleanup(), Some(1));

    assert!(h.store.inner.get(due.id.unwrap()).unwrap().is_none());
    assert!(h.store.inner.get(later.id.unwrap()).unwrap().is_some());
}

#[test]
fn processed_item_is_deleted_after_retention() {
    let h = Harness::new();
    let item = h.add("A");
    h.outbox.monitor();

    h.advance(Duration::from_secs(59));
    assert_eq!(h.outbox.cleanup(), Some(0));

    h.advance(Duration::from_secs(1));
    assert_eq!(h.outbox.cleanup(), Some(1));
    assert!(h.store.inner.get(item.id.unwrap()).unwrap().is_none());
}

#[test]
fn never_deletes_unfinished_items() {
    let h = Harness::new();
    h.handler.fail_on("A");
    let item = h.add("A");
    h.outbox.monitor();
    h.advance(Duration::from_secs(3600));

    assert_eq!(h.outbox.cleanup(), Some(0));
    assert!(h.store.inner.get(item.id.unwrap()).unwrap().is_some());
}

#[test]
fn cleanup_is_deferred_during_shutdown() {
    let h = Harness::new();
    completed(&h, epoch());
    h.outbox.shutdown().unwrap();

    assert_eq!(h.outbox.cleanup(), None);
    assert_eq!(h.cleanup_locks.acquires(), 0);
    assert_eq!(h.store.inner.len().unwrap(), 1);
}

#[test]
fn cleanup_lock_failure_skips_the_cycle() {
    let h = Harness::new();
    completed(&h, epoch());
    h.cleanup_locks.fail_acquire(true);

    assert_eq!(h.outbox.cleanup(), None);
    assert_eq!(h.cleanup_locks.releases(), 0);
    assert_eq!(h.store.inner.len().unwrap(), 1);
}
