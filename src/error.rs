use thiserror::Error;

use crate::item::OutboxType;
use crate::lock::LockError;

/// Top-level error returned by the outbox API.
#[derive(Debug, Error)]
pub enum OutboxError {
    /// More than one handler was registered for the same type.
    #[error("more than one handler provided for types: {0}")]
    DuplicateHandlers(String),

    /// A required collaborator was not supplied to the builder.
    #[error("missing required outbox configuration: {0}")]
    MissingConfiguration(&'static str),

    /// The outbox configuration could not be parsed or is invalid.
    #[error("invalid outbox configuration: {0}")]
    InvalidConfiguration(String),

    /// No handler is registered for the requested type.
    #[error("outbox item type \"{0}\" isn't supported")]
    UnsupportedType(OutboxType),

    /// The handler resolved for an item cannot process it.
    #[error("invalid outbox handler for item {id:?} of type {item_type}: {reason}")]
    InvalidHandler {
        id: Option<i64>,
        item_type: OutboxType,
        reason: String,
    },

    /// The payload could not be converted or serialized by its handler.
    #[error("payload serialization failed: {0}")]
    Serialization(#[source] HandlerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Error type for outbox store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An in-process storage lock was poisoned.
    #[error("outbox store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// The item to update has not been inserted yet.
    #[error("outbox item has no id; insert it before updating")]
    MissingId,

    /// The item to update does not exist (anymore).
    #[error("failed to update outbox item with id {0} as it doesn't exist")]
    NotFound(i64),

    /// Any backend specific failure (connection, query, constraint, ...).
    #[error("outbox store backend error: {0}")]
    Backend(String),
}

/// Error returned by [`OutboxHandler`](crate::OutboxHandler) implementations.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload encoding or decoding failed.
    #[error("payload codec error: {0}")]
    Codec(String),

    /// The handler ran and reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The handler panicked while running.
    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Codec(err.to_string())
    }
}

/// Error type for executors running processing hosts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// The executor refused the task (saturated or shutting down).
    #[error("task rejected: {0}")]
    Rejected(String),

    /// Internal executor state was poisoned by a panicking thread.
    #[error("executor state poisoned during {0}")]
    Poisoned(&'static str),

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}
