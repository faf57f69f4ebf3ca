use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use transactional_outbox::{
    HandlerError, InMemoryLockManager, InMemoryOutboxStore, ManualClock, OutboxError,
    OutboxHandler, OutboxStatus, OutboxStore, PayloadCodec, ProcessorDecorator, ProcessorTask,
    SimpleOutboxHandler, TransactionalOutboxBuilder,
};

use crate::support::{epoch, init_tracing, Harness, InlineExecutor, ITEM_TYPE};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct OrderPlaced {
    order_id: u64,
    customer: String,
}

#[test]
fn simple_handler_round_trips_typed_payloads() {
    init_tracing();
    let clock = ManualClock::new(epoch());
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let handler: Arc<dyn OutboxHandler> = Arc::new(
        SimpleOutboxHandler::new("order-placed", Arc::new(clock.clone()), move |order: OrderPlaced| {
            sink.lock().unwrap().push(order);
            Ok(())
        })
        .with_codec(PayloadCodec::Bitcode),
    );
    let locks = InMemoryLockManager::new();
    let store = InMemoryOutboxStore::new();
    let outbox = TransactionalOutboxBuilder::new()
        .with_handler(handler)
        .with_monitor_locks(locks.provider(1).unwrap())
        .with_cleanup_locks(locks.provider(2).unwrap())
        .with_store(Arc::new(store.clone()))
        .with_executor(Arc::new(InlineExecutor))
        .with_clock(Arc::new(clock))
        .build()
        .unwrap();
    let order = OrderPlaced {
        order_id: 7,
        customer: "ada".to_string(),
    };

    let item = outbox.add("order-placed", &order).unwrap();
    assert_ne!(item.payload, serde_json::to_string(&order).unwrap());

    outbox.monitor();

    assert_eq!(*received.lock().unwrap(), vec![order]);
    assert_eq!(
        store.get(item.id.unwrap()).unwrap().unwrap().status,
        OutboxStatus::Completed
    );
}

#[test]
fn simple_handler_failure_hook_receives_typed_payload() {
    init_tracing();
    let clock = ManualClock::new(epoch());
    let failed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failed);
    let handler: Arc<dyn OutboxHandler> = Arc::new(
        SimpleOutboxHandler::new("order-placed", Arc::new(clock.clone()), |_: OrderPlaced| {
            Err(HandlerError::failed("broker down"))
        })
        .with_max_retries(0)
        .with_failure_handler(move |order: OrderPlaced| sink.lock().unwrap().push(order.order_id)),
    );
    let locks = InMemoryLockManager::new();
    let store = InMemoryOutboxStore::new();
    let outbox = TransactionalOutboxBuilder::new()
        .with_handler(handler)
        .with_monitor_locks(locks.provider(1).unwrap())
        .with_cleanup_locks(locks.provider(2).unwrap())
        .with_store(Arc::new(store.clone()))
        .with_executor(Arc::new(InlineExecutor))
        .with_clock(Arc::new(clock))
        .build()
        .unwrap();

    let item = outbox
        .add(
            "order-placed",
            &OrderPlaced {
                order_id: 9,
                customer: "bob".to_string(),
            },
        )
        .unwrap();
    outbox.monitor();

    assert_eq!(*failed.lock().unwrap(), vec![9]);
    assert_eq!(
        store.get(item.id.unwrap()).unwrap().unwrap().status,
        OutboxStatus::Failed
    );
}

#[test]
fn adding_unsupported_type_is_rejected_without_persisting() {
    let h = Harness::new();

    let err = h.outbox.add("unknown", &"A").unwrap_err();

    assert!(matches!(err, OutboxError::UnsupportedType(t) if t.as_str() == "unknown"));
    assert!(h.store.inner.is_empty().unwrap());
}

#[test]
fn add_propagates_store_failures() {
    struct ReadOnlyStore;

    impl OutboxStore for ReadOnlyStore {
        fn insert(
            &self,
            _item: transactional_outbox::OutboxItem,
        ) -> Result<transactional_outbox::OutboxItem, transactional_outbox::StoreError> {
            Err(transactional_outbox::StoreError::Backend("read only".into()))
        }
        fn update(
            &self,
            item: &transactional_outbox::OutboxItem,
        ) -> Result<transactional_outbox::OutboxItem, transactional_outbox::StoreError> {
            Ok(item.clone())
        }
        fn fetch(
            &self,
            _filter: &transactional_outbox::OutboxFilter,
        ) -> Result<Vec<transactional_outbox::OutboxItem>, transactional_outbox::StoreError>
        {
            Ok(Vec::new())
        }
        fn delete_completed_items(
            &self,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> Result<usize, transactional_outbox::StoreError> {
            Ok(0)
        }
    }

    let h = Harness::with(|builder| builder.with_store(Arc::new(ReadOnlyStore)));

    let err = h.outbox.add(ITEM_TYPE, &"A").unwrap_err();

    assert!(matches!(err, OutboxError::Store(_)));
}

#[test]
fn decorators_wrap_every_group() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let decorator: Arc<dyn ProcessorDecorator> = Arc::new(move |task: ProcessorTask| -> ProcessorTask {
        let counter = Arc::clone(&counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            task();
        })
    });
    let h = Harness::inline(move |builder| builder.with_decorator(decorator));
    h.add("A");
    h.add("B");

    h.outbox.monitor();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.handler.handled(), vec!["A", "B"]);
}

#[test]
fn invalid_handler_leaves_item_running_and_group_continues() {
    use transactional_outbox::{OutboxItem, OutboxType};

    let h = Harness::inline(|builder| builder.with_group_id_provider(crate::support::group_by_prefix()));
    let orphan = h
        .store
        .inner
        .insert(OutboxItem::new(
            OutboxType::new("retired-type"),
            "g:orphan",
            epoch() - chrono::Duration::seconds(1),
            Some("g".to_string()),
        ))
        .unwrap();
    let next = h.add("g:next");

    h.outbox.monitor();

    assert_eq!(h.store.item(orphan.id).status, OutboxStatus::Running);
    assert_eq!(h.store.item(next.id).status, OutboxStatus::Completed);
    assert_eq!(h.handler.handled(), vec!["g:next"]);

    h.advance(Duration::from_secs(2 * 60 * 60));
    assert_eq!(h.outbox.monitor().claimed, 1);
}
