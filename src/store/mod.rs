//! Outbox item persistence.
//!
//! - `OutboxStore` - Contract for the durable store
//! - `OutboxFilter` - Eligibility filter used by monitor cycles
//! - `InMemoryOutboxStore` - Process-local store for single-node use and tests

mod filter;
mod in_memory;
#[allow(clippy::module_inception)]
mod store;

pub use filter::OutboxFilter;
pub use in_memory::InMemoryOutboxStore;
pub use store::OutboxStore;
