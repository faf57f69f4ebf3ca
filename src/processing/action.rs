use crate::error::OutboxError;

/// Unit of work run by a [`ProcessingHost`](super::ProcessingHost).
pub trait ProcessingAction: Send + Sync {
    fn run(&self) -> Result<(), OutboxError>;

    /// Return claimed but unprocessed items to PENDING.
    fn reset(&self);
}
