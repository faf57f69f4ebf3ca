use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::OutboxHandler;
use crate::error::OutboxError;
use crate::item::{OutboxItem, OutboxType};

/// Immutable type → handler map, built once when the outbox is constructed.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<OutboxType, Arc<dyn OutboxHandler>>,
}

impl HandlerRegistry {
    /// Build the registry, rejecting more than one handler for the same type.
    pub fn new(
        handlers: impl IntoIterator<Item = Arc<dyn OutboxHandler>>,
    ) -> Result<Self, OutboxError> {
        let mut by_type: BTreeMap<OutboxType, Vec<Arc<dyn OutboxHandler>>> = BTreeMap::new();
        for handler in handlers {
            by_type.entry(handler.supported_type()).or_default().push(handler);
        }

        let duplicates: Vec<String> = by_type
            .iter()
            .filter(|(_, handlers)| handlers.len() > 1)
            .map(|(item_type, handlers)| format!("{} -> {} handlers", item_type, handlers.len()))
            .collect();
        if !duplicates.is_empty() {
            return Err(OutboxError::DuplicateHandlers(duplicates.join(", ")));
        }

        let handlers = by_type
            .into_iter()
            .filter_map(|(item_type, mut handlers)| handlers.pop().map(|h| (item_type, h)))
            .collect();
        Ok(HandlerRegistry { handlers })
    }

    pub fn get(&self, item_type: &OutboxType) -> Option<&Arc<dyn OutboxHandler>> {
        self.handlers.get(item_type)
    }

    /// Handler for `item_type`, or `UnsupportedType`. Used when adding items.
    pub fn require(&self, item_type: &OutboxType) -> Result<&Arc<dyn OutboxHandler>, OutboxError> {
        self.get(item_type)
            .ok_or_else(|| OutboxError::UnsupportedType(item_type.clone()))
    }

    /// Handler able to process `item`, or `InvalidHandler`. Used when processing.
    pub fn resolve(&self, item: &OutboxItem) -> Result<Arc<dyn OutboxHandler>, OutboxError> {
        let handler = self.get(&item.item_type).ok_or_else(|| OutboxError::InvalidHandler {
            id: item.id,
            item_type: item.item_type.clone(),
            reason: "handler could not be resolved".to_string(),
        })?;

        if !handler.supports(&item.item_type) {
            return Err(OutboxError::InvalidHandler {
                id: item.id,
                item_type: item.item_type.clone(),
                reason: format!("handler supports type {} instead", handler.supported_type()),
            });
        }

        Ok(Arc::clone(handler))
    }

    pub fn types(&self) -> Vec<&OutboxType> {
        let mut types: Vec<&OutboxType> = self.handlers.keys().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
