use chrono::{DateTime, Utc};

use crate::item::{OutboxItem, OutboxStatus};

/// Selects the items a monitor cycle may claim.
///
/// An item matches when it is PENDING with `next_run` before
/// `next_run_less_than`, or RUNNING with `rerun_after` before
/// `rerun_after_less_than`. Stores additionally return the non-completed
/// siblings of every matching grouped item so the group can be ordered as a
/// whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutboxFilter {
    pub next_run_less_than: DateTime<Utc>,
    pub rerun_after_less_than: DateTime<Utc>,
    /// Narrow the cycle to one item.
    pub id: Option<i64>,
}

impl OutboxFilter {
    /// The filter used by a monitor cycle running at `now`.
    pub fn due_at(now: DateTime<Utc>) -> Self {
        OutboxFilter {
            next_run_less_than: now,
            rerun_after_less_than: now,
            id: None,
        }
    }

    pub fn with_id(mut self, id: Option<i64>) -> Self {
        self.id = id;
        self
    }

    pub fn matches(&self, item: &OutboxItem) -> bool {
        if self.id.is_some() && item.id != self.id {
            return false;
        }
        match item.status {
            OutboxStatus::Pending => item.next_run < self.next_run_less_than,
            OutboxStatus::Running => item
                .rerun_after
                .map(|rerun| rerun < self.rerun_after_less_than)
                .unwrap_or(false),
            OutboxStatus::Completed | OutboxStatus::Failed => false,
        }
    }
}
