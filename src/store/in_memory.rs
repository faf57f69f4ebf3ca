use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::warn;

use super::{OutboxFilter, OutboxStore};
use crate::error::StoreError;
use crate::item::OutboxItem;

/// Process-local store backed by `Arc<RwLock<BTreeMap<i64, OutboxItem>>>`.
///
/// Cloning creates another handle to the same storage, so a test can keep a
/// handle to inspect items while the outbox owns another.
#[derive(Clone)]
pub struct InMemoryOutboxStore {
    items: Arc<RwLock<BTreeMap<i64, OutboxItem>>>,
    seq: Arc<AtomicI64>,
}

impl InMemoryOutboxStore {
    pub fn new() -> Self {
        InMemoryOutboxStore {
            items: Arc::new(RwLock::new(BTreeMap::new())),
            seq: Arc::new(AtomicI64::new(1)),
        }
    }

    pub fn get(&self, id: i64) -> Result<Option<OutboxItem>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(items.get(&id).cloned())
    }

    /// Every stored item, ordered by id.
    pub fn all(&self) -> Result<Vec<OutboxItem>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(items.values().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(items.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryOutboxStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboxStore for InMemoryOutboxStore {
    fn insert(&self, item: OutboxItem) -> Result<OutboxItem, StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert"))?;
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let stored = item.snapshot().with_id(id);
        items.insert(id, stored.clone());
        Ok(stored)
    }

    fn update(&self, item: &OutboxItem) -> Result<OutboxItem, StoreError> {
        let id = item.id.ok_or(StoreError::MissingId)?;
        let mut items = self
            .items
            .write()
            .map_err(|_| StoreError::LockPoisoned("update"))?;
        let stored = items.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if stored.group_id != item.group_id {
            warn!(
                item_id = id,
                stored_group = ?stored.group_id,
                group = ?item.group_id,
                "group id of outbox item cannot change; keeping the stored one"
            );
        }
        stored.status = item.status;
        stored.retries = item.retries;
        stored.next_run = item.next_run;
        stored.last_execution = item.last_execution;
        stored.rerun_after = item.rerun_after;
        stored.delete_after = item.delete_after;

        Ok(stored.clone())
    }

    fn fetch(&self, filter: &OutboxFilter) -> Result<Vec<OutboxItem>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| StoreError::LockPoisoned("fetch"))?;

        let matching: BTreeSet<i64> = items
            .iter()
            .filter(|(_, item)| filter.matches(item))
            .map(|(id, _)| *id)
            .collect();
        let groups: BTreeSet<&str> = matching
            .iter()
            .filter_map(|id| items.get(id))
            .filter_map(|item| item.group_id.as_deref())
            .collect();

        Ok(items
            .iter()
            .filter(|(id, item)| {
                matching.contains(*id)
                    || (!item.is_completed()
                        && item
                            .group_id
                            .as_deref()
                            .map(|group| groups.contains(group))
                            .unwrap_or(false))
            })
            .map(|(_, item)| item.clone())
            .collect())
    }

    fn delete_completed_items(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StoreError::LockPoisoned("delete"))?;
        let before = items.len();
        items.retain(|_, item| {
            !(item.is_completed()
                && item
                    .delete_after
                    .map(|delete_after| delete_after <= now)
                    .unwrap_or(false))
        });
        Ok(before - items.len())
    }
}
