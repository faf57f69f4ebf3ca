use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OutboxStatus;
use crate::clock::add_duration;

/// Business payload handed to [`TransactionalOutbox::add`](crate::TransactionalOutbox::add)
/// before the handler serializes it.
pub type OutboxPayload = serde_json::Value;

/// Logical type of an outbox item; selects the handler that processes it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutboxType(String);

impl OutboxType {
    pub fn new(value: impl Into<String>) -> Self {
        OutboxType(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutboxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OutboxType {
    fn from(value: &str) -> Self {
        OutboxType(value.to_string())
    }
}

impl From<String> for OutboxType {
    fn from(value: String) -> Self {
        OutboxType(value)
    }
}

/// A persisted unit of work.
///
/// Status transitions are applied through the methods below so that the
/// monitor, the processors and the reset path all move items through the
/// same state machine. Stores persist the full snapshot after each one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxItem {
    /// Assigned by the store on insert.
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub item_type: OutboxType,
    pub status: OutboxStatus,
    /// Handler-serialized payload.
    pub payload: String,
    pub retries: u32,
    pub next_run: DateTime<Utc>,
    pub last_execution: Option<DateTime<Utc>>,
    pub rerun_after: Option<DateTime<Utc>>,
    pub delete_after: Option<DateTime<Utc>>,
    /// Items sharing a group id are processed sequentially, in fetch order.
    pub group_id: Option<String>,
    /// Set within a single monitor cycle; never persisted.
    #[serde(skip)]
    marked_for_processing: bool,
}

impl OutboxItem {
    /// Create a new, not yet inserted, pending item.
    pub fn new(
        item_type: OutboxType,
        payload: impl Into<String>,
        next_run: DateTime<Utc>,
        group_id: Option<String>,
    ) -> Self {
        OutboxItem {
            id: None,
            item_type,
            status: OutboxStatus::Pending,
            payload: payload.into(),
            retries: 0,
            next_run,
            last_execution: None,
            rerun_after: None,
            delete_after: None,
            group_id,
            marked_for_processing: false,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == OutboxStatus::Pending
    }

    pub fn is_running(&self) -> bool {
        self.status == OutboxStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == OutboxStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == OutboxStatus::Failed
    }

    pub fn is_marked_for_processing(&self) -> bool {
        self.marked_for_processing
    }

    /// A copy detached from any in-cycle state (the processing mark is cleared).
    pub fn snapshot(&self) -> Self {
        OutboxItem {
            marked_for_processing: false,
            ..self.clone()
        }
    }

    /// PENDING and due.
    pub fn is_pending_eligible(&self, now: DateTime<Utc>) -> bool {
        self.status == OutboxStatus::Pending && self.next_run < now
    }

    /// RUNNING and past its staleness window.
    pub fn is_running_eligible(&self, now: DateTime<Utc>) -> bool {
        self.status == OutboxStatus::Running
            && self.rerun_after.map(|rerun| rerun < now).unwrap_or(false)
    }

    pub fn is_eligible_for_processing(&self, now: DateTime<Utc>) -> bool {
        self.is_pending_eligible(now) || self.is_running_eligible(now)
    }

    /// Claim the item for the current monitor cycle if it is eligible.
    ///
    /// Once marked, later calls within the same cycle are no-ops: the item is
    /// RUNNING with a future `rerun_after` and would otherwise no longer look
    /// eligible. Returns whether the item is marked.
    pub fn prepare_for_processing(&mut self, now: DateTime<Utc>, rerun_after: DateTime<Utc>) -> bool {
        if self.marked_for_processing {
            return true;
        }
        if self.is_eligible_for_processing(now) {
            self.marked_for_processing = true;
            self.status = OutboxStatus::Running;
            self.last_execution = Some(now);
            self.rerun_after = Some(rerun_after);
        }
        self.marked_for_processing
    }

    /// RUNNING → COMPLETED.
    pub fn complete(&mut self, now: DateTime<Utc>, retention: Duration) {
        self.status = OutboxStatus::Completed;
        self.delete_after = Some(add_duration(now, retention));
    }

    /// RUNNING → PENDING, one more retry recorded.
    pub fn schedule_retry(&mut self, next_run: DateTime<Utc>) {
        self.next_run = next_run;
        self.retries = self.retries.saturating_add(1);
        self.status = OutboxStatus::Pending;
    }

    /// RUNNING → FAILED.
    pub fn fail(&mut self) {
        self.status = OutboxStatus::Failed;
    }

    /// Return a claimed but never executed item to PENDING.
    ///
    /// Only RUNNING items are touched; returns whether anything changed. The
    /// processing mark is cleared so the item no longer counts as claimed.
    pub fn reset(&mut self) -> bool {
        if self.status != OutboxStatus::Running {
            return false;
        }
        self.marked_for_processing = false;
        self.status = OutboxStatus::Pending;
        self.rerun_after = None;
        true
    }
}
