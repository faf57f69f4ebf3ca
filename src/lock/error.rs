use thiserror::Error;

/// Failure of a monitor or cleanup lock provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock poisoned: {0}")]
    Poisoned(String),
    #[error("lock acquire failed: {0}")]
    AcquireFailed(String),
    #[error("lock release failed: {0}")]
    ReleaseFailed(String),
    /// A lease-based backend lost the lock before release.
    #[error("lock expired: {0}")]
    Expired(String),
    #[error("lock error: {0}")]
    Other(String),
}
