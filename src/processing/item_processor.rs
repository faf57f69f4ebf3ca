use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::{HandlerError, OutboxError};
use crate::handler::HandlerRegistry;
use crate::item::OutboxItem;
use crate::store::OutboxStore;

/// What happened to an item during one processing attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    Completed,
    /// Handler failed below the retry limit; back to PENDING.
    Retrying { retries: u32, next_run: DateTime<Utc> },
    /// Handler failed at the retry limit; the failure hook ran.
    Failed,
    /// Not claimed in this cycle, or already reset.
    Skipped,
}

/// Runs the handler for one claimed item and persists the result.
///
/// The item sits behind a mutex so `process` and `reset` never interleave.
pub struct OutboxItemProcessor {
    item: Mutex<OutboxItem>,
    registry: Arc<HandlerRegistry>,
    store: Arc<dyn OutboxStore>,
    clock: Arc<dyn Clock>,
}

impl OutboxItemProcessor {
    pub fn new(
        item: OutboxItem,
        registry: Arc<HandlerRegistry>,
        store: Arc<dyn OutboxStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        OutboxItemProcessor {
            item: Mutex::new(item),
            registry,
            store,
            clock,
        }
    }

    pub fn item_id(&self) -> Option<i64> {
        self.item().id
    }

    /// Current in-memory state of the item.
    pub fn item_snapshot(&self) -> OutboxItem {
        self.item().snapshot()
    }

    pub fn process(&self) -> Result<ItemOutcome, OutboxError> {
        let mut item = self.item();
        if !item.is_marked_for_processing() || !item.is_running() {
            debug!(item_id = ?item.id, status = %item.status, "outbox item not claimed in this cycle; skipping");
            return Ok(ItemOutcome::Skipped);
        }

        let handler = self.registry.resolve(&item)?;

        let result = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&item.payload)))
            .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(panic.as_ref()))));

        let now = self.clock.now();
        let outcome = match result {
            Ok(()) => {
                item.complete(now, handler.retention_duration());
                ItemOutcome::Completed
            }
            Err(err) if handler.has_reached_max_retries(item.retries) => {
                error!(
                    item_id = ?item.id,
                    item_type = %item.item_type,
                    retries = item.retries,
                    error = %err,
                    "outbox item reached max retries; marking failed"
                );
                item.fail();
                let payload = item.payload.as_str();
                if panic::catch_unwind(AssertUnwindSafe(|| handler.handle_failure(payload))).is_err() {
                    error!(item_id = ?item.id, "failure handler panicked");
                }
                ItemOutcome::Failed
            }
            Err(err) => {
                let next_run = handler.next_execution_time(item.retries);
                item.schedule_retry(next_run);
                warn!(
                    item_id = ?item.id,
                    item_type = %item.item_type,
                    retries = item.retries,
                    %next_run,
                    error = %err,
                    "outbox item failed; scheduled for retry"
                );
                ItemOutcome::Retrying {
                    retries: item.retries,
                    next_run,
                }
            }
        };

        self.store.update(&item)?;
        Ok(outcome)
    }

    /// Revert a claimed item that never ran back to PENDING.
    pub fn reset(&self) {
        let mut item = self.item();
        if !item.reset() {
            return;
        }
        match self.store.update(&item) {
            Ok(_) => info!(item_id = ?item.id, "outbox item reset to pending"),
            Err(err) => error!(item_id = ?item.id, error = %err, "failed to persist outbox item reset"),
        }
    }

    fn item(&self) -> MutexGuard<'_, OutboxItem> {
        self.item.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
