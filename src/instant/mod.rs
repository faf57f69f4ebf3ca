//! Instant (on-demand) processing signals.
//!
//! - `InstantOutboxPublisher` - Contract notified after an instant item is inserted
//! - `NoopInstantPublisher` - Ignores events (the default)
//! - `ChannelInstantPublisher` - Forwards events over an mpsc channel
//! - `EmitterInstantPublisher` - In-process event emitter (requires `emitter` feature)

#[cfg(feature = "emitter")]
mod emitter;
mod publisher;

#[cfg(feature = "emitter")]
pub use emitter::EmitterInstantPublisher;
pub use publisher::{
    ChannelInstantPublisher, InstantOutboxEvent, InstantOutboxPublisher, NoopInstantPublisher,
};
