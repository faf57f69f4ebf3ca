//! The persisted unit of work and its state machine.
//!
//! - `OutboxItem` - Item value type with transition methods
//! - `OutboxStatus` - PENDING / RUNNING / COMPLETED / FAILED
//! - `OutboxItemGroup` - Items processed sequentially as one task
//! - `OutboxItemFactory` - Builds new items from a type and payload

mod factory;
mod group;
mod outbox_item;
mod status;

pub use factory::OutboxItemFactory;
pub use group::OutboxItemGroup;
pub use outbox_item::{OutboxItem, OutboxPayload, OutboxType};
pub use status::OutboxStatus;
