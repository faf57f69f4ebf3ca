use uuid::Uuid;

use crate::item::{OutboxPayload, OutboxType};

/// Assigns a group id to an item when it is added.
///
/// Items sharing a group id are processed sequentially, in order. `None`
/// means the item is not part of a group.
pub trait GroupIdProvider: Send + Sync {
    fn execute(&self, item_type: &OutboxType, payload: &OutboxPayload) -> Option<String>;
}

impl<F> GroupIdProvider for F
where
    F: Fn(&OutboxType, &OutboxPayload) -> Option<String> + Send + Sync,
{
    fn execute(&self, item_type: &OutboxType, payload: &OutboxPayload) -> Option<String> {
        self(item_type, payload)
    }
}

/// Never groups items. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGroupIdProvider;

impl GroupIdProvider for NullGroupIdProvider {
    fn execute(&self, _item_type: &OutboxType, _payload: &OutboxPayload) -> Option<String> {
        None
    }
}

/// Puts every item in its own, randomly named group.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomGroupIdProvider;

impl GroupIdProvider for RandomGroupIdProvider {
    fn execute(&self, _item_type: &OutboxType, _payload: &OutboxPayload) -> Option<String> {
        Some(Uuid::new_v4().to_string())
    }
}
