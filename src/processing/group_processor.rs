use std::sync::Arc;

use tracing::{debug, error};

use super::{ItemOutcome, OutboxItemProcessor, ProcessingAction};
use crate::clock::Clock;
use crate::error::OutboxError;
use crate::handler::HandlerRegistry;
use crate::item::OutboxItemGroup;
use crate::store::OutboxStore;

/// Processes the items of one group strictly in order.
///
/// Each item contains its own failure: a handler error, a panic, an
/// unresolvable handler or a store error is logged and the next item runs.
pub struct OutboxGroupProcessor {
    processors: Vec<OutboxItemProcessor>,
}

impl OutboxGroupProcessor {
    pub fn new(
        group: OutboxItemGroup,
        registry: Arc<HandlerRegistry>,
        store: Arc<dyn OutboxStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let processors = group
            .into_iter()
            .map(|item| {
                OutboxItemProcessor::new(
                    item,
                    Arc::clone(&registry),
                    Arc::clone(&store),
                    Arc::clone(&clock),
                )
            })
            .collect();
        OutboxGroupProcessor { processors }
    }

    pub fn item_ids(&self) -> Vec<i64> {
        self.processors
            .iter()
            .filter_map(OutboxItemProcessor::item_id)
            .collect()
    }
}

impl ProcessingAction for OutboxGroupProcessor {
    fn run(&self) -> Result<(), OutboxError> {
        for processor in &self.processors {
            match processor.process() {
                Ok(ItemOutcome::Skipped) => {}
                Ok(outcome) => debug!(item_id = ?processor.item_id(), ?outcome, "outbox item processed"),
                Err(err) => error!(
                    item_id = ?processor.item_id(),
                    error = %err,
                    "failed to process outbox item"
                ),
            }
        }
        Ok(())
    }

    fn reset(&self) {
        for processor in &self.processors {
            processor.reset();
        }
    }
}
