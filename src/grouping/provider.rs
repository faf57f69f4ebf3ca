use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::{FifoOrderingProvider, OrderingProvider};
use crate::item::{OutboxItem, OutboxItemGroup};

/// Partitions a fetched batch into groups, each submitted as one task.
pub trait GroupingProvider: Send + Sync {
    fn execute(&self, items: Vec<OutboxItem>) -> Vec<OutboxItemGroup>;
}

/// Groups items by `group_id`, ordering each group with an [`OrderingProvider`].
///
/// Items without a group id get a synthetic one-off key, so they form
/// singleton groups while groups are still emitted in the order their first
/// item was fetched.
#[derive(Clone)]
pub struct GroupIdGroupingProvider {
    ordering: Arc<dyn OrderingProvider>,
}

impl GroupIdGroupingProvider {
    pub fn new(ordering: Arc<dyn OrderingProvider>) -> Self {
        GroupIdGroupingProvider { ordering }
    }
}

impl Default for GroupIdGroupingProvider {
    fn default() -> Self {
        Self::new(Arc::new(FifoOrderingProvider))
    }
}

impl GroupingProvider for GroupIdGroupingProvider {
    fn execute(&self, items: Vec<OutboxItem>) -> Vec<OutboxItemGroup> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut buckets: Vec<Vec<OutboxItem>> = Vec::new();

        for item in items {
            let key = item
                .group_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let position = *positions.entry(key).or_insert_with(|| {
                buckets.push(Vec::new());
                buckets.len() - 1
            });
            buckets[position].push(item);
        }

        buckets
            .into_iter()
            .map(|bucket| OutboxItemGroup::new(self.ordering.execute(bucket)))
            .collect()
    }
}

/// One group per item; no ordering coupling between items.
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleItemGroupingProvider;

impl GroupingProvider for SingleItemGroupingProvider {
    fn execute(&self, items: Vec<OutboxItem>) -> Vec<OutboxItemGroup> {
        items.into_iter().map(OutboxItemGroup::of).collect()
    }
}
