use std::sync::Arc;

use chrono::Duration;

use super::{OutboxItem, OutboxPayload, OutboxType};
use crate::error::OutboxError;
use crate::grouping::GroupIdProvider;
use crate::handler::HandlerRegistry;

/// Builds new PENDING items from a type and a business payload.
#[derive(Clone)]
pub struct OutboxItemFactory {
    registry: Arc<HandlerRegistry>,
    group_id_provider: Arc<dyn GroupIdProvider>,
}

impl OutboxItemFactory {
    pub fn new(registry: Arc<HandlerRegistry>, group_id_provider: Arc<dyn GroupIdProvider>) -> Self {
        OutboxItemFactory {
            registry,
            group_id_provider,
        }
    }

    /// A PENDING item due one millisecond before the handler's first run,
    /// so the next monitor cycle (or an instant one) picks it up.
    pub fn make_scheduled_item(
        &self,
        item_type: &OutboxType,
        payload: &OutboxPayload,
    ) -> Result<OutboxItem, OutboxError> {
        let handler = self.registry.require(item_type)?;
        let serialized = handler
            .serialize(payload)
            .map_err(OutboxError::Serialization)?;
        let first_run = handler.next_execution_time(0);
        let next_run = first_run
            .checked_sub_signed(Duration::milliseconds(1))
            .unwrap_or(first_run);
        let group_id = self.group_id_provider.execute(item_type, payload);

        Ok(OutboxItem::new(item_type.clone(), serialized, next_run, group_id))
    }
}
