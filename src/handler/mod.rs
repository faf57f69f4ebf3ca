//! Handlers - the pluggable business logic behind each outbox item type.
//!
//! - `OutboxHandler` - Contract implemented per item type
//! - `HandlerRegistry` - Immutable type → handler map with duplicate detection
//! - `SimpleOutboxHandler` - Closure-driven handler for a typed payload
//! - `PayloadCodec` - JSON or bitcode encoding of typed payloads

mod codec;
#[allow(clippy::module_inception)]
mod handler;
mod registry;
mod simple;

pub use codec::PayloadCodec;
pub use handler::OutboxHandler;
pub use registry::HandlerRegistry;
pub use simple::SimpleOutboxHandler;
