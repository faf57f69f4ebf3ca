use std::fmt;

use serde::{Deserialize, Serialize};

/// Processing status of an outbox item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxStatus {
    /// Ready to be processed once `next_run` has passed.
    #[default]
    Pending,
    /// Claimed by a monitor cycle; re-claimable once `rerun_after` has passed.
    Running,
    /// Handled successfully; deleted by cleanup after `delete_after`.
    Completed,
    /// Reached max retries; the handler's failure hook has been invoked.
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "PENDING",
            OutboxStatus::Running => "RUNNING",
            OutboxStatus::Completed => "COMPLETED",
            OutboxStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OutboxStatus::Completed | OutboxStatus::Failed)
    }
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
