use std::sync::Arc;
use std::time::Duration;

use transactional_outbox::{
    ChannelInstantPublisher, InstantProcessingThread, OutboxSchedulerThread, OutboxStatus,
};

use crate::support::{wait_until, Harness, ITEM_TYPE};

#[test]
fn scheduler_runs_monitor_and_cleanup_cycles() {
    let h = Harness::with(|builder| builder);
    let item = h.add("A");

    let scheduler = OutboxSchedulerThread::spawn(
        Arc::clone(&h.outbox),
        Duration::from_millis(20),
        Some(Duration::ZERO),
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        h.store.item(item.id).status == OutboxStatus::Completed
    }));
    h.advance(Duration::from_secs(61));
    assert!(wait_until(Duration::from_secs(2), || {
        h.store.inner.is_empty().unwrap()
    }));

    let stats = scheduler.stop();
    assert!(stats.monitor_cycles >= 2);
    assert_eq!(stats.items_claimed, 1);
    assert_eq!(stats.items_deleted, 1);
    assert!(stats.cleanup_cycles >= 1);

    h.outbox.shutdown().unwrap();
}

#[test]
fn stopped_scheduler_no_longer_claims() {
    let h = Harness::new();
    let scheduler =
        OutboxSchedulerThread::spawn(Arc::clone(&h.outbox), Duration::from_millis(10), None)
            .unwrap();
    let stats = scheduler.stop();
    assert!(stats.monitor_cycles >= 1);

    let item = h.add("A");
    std::thread::sleep(Duration::from_millis(50));
    assert!(h.store.item(item.id).is_pending());
}

#[test]
fn instant_items_are_processed_through_the_channel() {
    let (publisher, events) = ChannelInstantPublisher::new();
    let h = Harness::with(move |builder| builder.with_instant_publisher(Arc::new(publisher)));
    let instant = InstantProcessingThread::spawn(Arc::downgrade(&h.outbox), events).unwrap();

    let waiting = h.add("scheduled");
    let item = h.outbox.add_instant(ITEM_TYPE, &"now").unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        h.store.item(item.id).status == OutboxStatus::Completed
    }));
    assert_eq!(h.handler.handled(), vec!["now"]);
    assert!(h.store.item(waiting.id).is_pending());

    assert_eq!(instant.stop(), 1);
    h.outbox.shutdown().unwrap();
}

#[cfg(feature = "emitter")]
#[test]
fn emitter_publisher_triggers_a_scoped_cycle() {
    use transactional_outbox::EmitterInstantPublisher;

    let publisher = Arc::new(EmitterInstantPublisher::new());
    let configured = Arc::clone(&publisher);
    let h = Harness::with(move |builder| builder.with_instant_publisher(configured));
    let outbox = Arc::downgrade(&h.outbox);
    publisher.on_instant(move |id| {
        if let Some(outbox) = outbox.upgrade() {
            outbox.monitor_item(id);
        }
    });

    let item = h.outbox.add_instant(ITEM_TYPE, &"now").unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        h.store.item(item.id).status == OutboxStatus::Completed
    }));
    h.outbox.shutdown().unwrap();
}
