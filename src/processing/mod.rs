//! Execution of claimed items.
//!
//! - `OutboxItemProcessor` - Runs one item and applies the retry policy
//! - `OutboxGroupProcessor` - Runs the items of a group in order
//! - `ProcessingHost` - Decorated, resettable task submitted to the executor
//! - `ProcessorDecorator` - Caller hook wrapping every task

mod action;
mod decorator;
mod group_processor;
mod host;
mod item_processor;

pub use action::ProcessingAction;
pub use decorator::{ProcessorDecorator, ProcessorTask};
pub use group_processor::OutboxGroupProcessor;
pub use host::ProcessingHost;
pub use item_processor::{ItemOutcome, OutboxItemProcessor};
pub(crate) use item_processor::panic_message;
