//! Background threads driving the outbox.
//!
//! - `OutboxSchedulerThread` - Periodic monitor and cleanup cycles
//! - `InstantProcessingThread` - Scoped cycles for instant items

mod instant;
mod scheduler;

pub use instant::InstantProcessingThread;
pub use scheduler::{OutboxSchedulerThread, SchedulerStats};
