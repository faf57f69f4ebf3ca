use std::sync::mpsc::{channel, Receiver, Sender};

use tracing::{debug, warn};

use crate::item::OutboxItem;

/// Raised after an item that asked for immediate processing was inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstantOutboxEvent {
    pub item: OutboxItem,
}

impl InstantOutboxEvent {
    pub fn new(item: OutboxItem) -> Self {
        InstantOutboxEvent { item }
    }

    pub fn item_id(&self) -> Option<i64> {
        self.item.id
    }
}

/// Delivers [`InstantOutboxEvent`]s to whatever runs the scoped monitor cycle.
///
/// The listener is expected to call
/// [`TransactionalOutbox::monitor_item`](crate::TransactionalOutbox::monitor_item)
/// once the transaction that created the item has committed.
pub trait InstantOutboxPublisher: Send + Sync {
    fn publish(&self, event: InstantOutboxEvent);
}

/// Drops every event; items are picked up by the next regular monitor cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstantPublisher;

impl InstantOutboxPublisher for NoopInstantPublisher {
    fn publish(&self, event: InstantOutboxEvent) {
        debug!(item_id = ?event.item_id(), "no instant publisher configured; item waits for the next cycle");
    }
}

/// Sends events over a `std::sync::mpsc` channel.
///
/// Pair the receiver with an
/// [`InstantProcessingThread`](crate::InstantProcessingThread).
pub struct ChannelInstantPublisher {
    sender: Sender<InstantOutboxEvent>,
}

impl ChannelInstantPublisher {
    pub fn new() -> (Self, Receiver<InstantOutboxEvent>) {
        let (sender, receiver) = channel();
        (ChannelInstantPublisher { sender }, receiver)
    }
}

impl InstantOutboxPublisher for ChannelInstantPublisher {
    fn publish(&self, event: InstantOutboxEvent) {
        let item_id = event.item_id();
        if self.sender.send(event).is_err() {
            warn!(?item_id, "instant outbox receiver is gone; item waits for the next cycle");
        }
    }
}
