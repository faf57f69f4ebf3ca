use std::sync::Mutex;

use event_emitter_rs::EventEmitter;

use super::{InstantOutboxEvent, InstantOutboxPublisher};

/// Emits instant events through an in-process [`EventEmitter`].
///
/// Listeners receive the id of the inserted item on [`Self::EVENT`].
/// Requires the `emitter` feature.
///
/// ## Example
///
/// ```ignore
/// let publisher = Arc::new(EmitterInstantPublisher::new());
/// let weak = Arc::downgrade(&outbox);
/// publisher.on_instant(move |id| {
///     if let Some(outbox) = weak.upgrade() {
///         outbox.monitor_item(id);
///     }
/// });
/// ```
pub struct EmitterInstantPublisher {
    emitter: Mutex<EventEmitter>,
}

impl EmitterInstantPublisher {
    pub const EVENT: &'static str = "outbox.instant";

    pub fn new() -> Self {
        Self::with_emitter(EventEmitter::new())
    }

    pub fn with_emitter(emitter: EventEmitter) -> Self {
        EmitterInstantPublisher {
            emitter: Mutex::new(emitter),
        }
    }

    /// Register a listener for inserted item ids. Returns the listener id.
    pub fn on_instant<F>(&self, listener: F) -> String
    where
        F: Fn(i64) + Send + Sync + 'static,
    {
        let mut emitter = self
            .emitter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        emitter.on(Self::EVENT, listener)
    }
}

impl Default for EmitterInstantPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl InstantOutboxPublisher for EmitterInstantPublisher {
    fn publish(&self, event: InstantOutboxEvent) {
        let Some(id) = event.item_id() else {
            return;
        };
        let mut emitter = self
            .emitter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        emitter.emit(Self::EVENT, id);
    }
}
