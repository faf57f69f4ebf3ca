use crate::item::OutboxItem;

/// Decides the order in which the items of one group are processed.
pub trait OrderingProvider: Send + Sync {
    fn execute(&self, items: Vec<OutboxItem>) -> Vec<OutboxItem>;
}

/// Keeps the order in which the store returned the items.
#[derive(Debug, Default, Clone, Copy)]
pub struct FifoOrderingProvider;

impl OrderingProvider for FifoOrderingProvider {
    fn execute(&self, items: Vec<OutboxItem>) -> Vec<OutboxItem> {
        items
    }
}
