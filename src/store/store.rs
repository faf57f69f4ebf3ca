use chrono::{DateTime, Utc};

use super::OutboxFilter;
use crate::error::StoreError;
use crate::item::OutboxItem;

/// Durable storage for outbox items.
///
/// Implementations are expected to take part in the caller's database
/// transaction for `insert`, so that an item is persisted if and only if the
/// business change that produced it is. All methods may be called
/// concurrently from the monitor and from worker threads.
pub trait OutboxStore: Send + Sync {
    /// Persist a new item and return it with its assigned id.
    fn insert(&self, item: OutboxItem) -> Result<OutboxItem, StoreError>;

    /// Reload the stored item by id, copy the processing state of `item`
    /// onto it and persist it. Returns the stored item.
    fn update(&self, item: &OutboxItem) -> Result<OutboxItem, StoreError>;

    /// Items matching `filter` plus the non-completed siblings of their
    /// groups, in a stable order.
    fn fetch(&self, filter: &OutboxFilter) -> Result<Vec<OutboxItem>, StoreError>;

    /// Delete COMPLETED items whose `delete_after` is at or before `now`.
    /// Returns the number of deleted items.
    fn delete_completed_items(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;
}
