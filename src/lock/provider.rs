use super::LockError;

/// Mutual exclusion between outbox instances.
///
/// The monitor and the cleanup cycle each hold their own provider, so they
/// never block one another. In a multi-node deployment this is typically a
/// database advisory lock keyed by a fixed id; in a single process the
/// [`InMemoryLocksProvider`](super::InMemoryLocksProvider) is enough.
pub trait OutboxLocksProvider: Send + Sync {
    /// Acquire the lock, blocking until it becomes available.
    fn acquire(&self) -> Result<(), LockError>;

    /// Release the lock.
    fn release(&self) -> Result<(), LockError>;
}
