use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::clock::{add_duration, Clock};
use crate::error::{HandlerError, OutboxError};
use crate::executor::OutboxExecutor;
use crate::grouping::GroupingProvider;
use crate::handler::HandlerRegistry;
use crate::instant::{InstantOutboxEvent, InstantOutboxPublisher};
use crate::item::{OutboxItem, OutboxItemFactory, OutboxItemGroup, OutboxStatus, OutboxType};
use crate::lock::OutboxLocksProvider;
use crate::processing::{panic_message, OutboxGroupProcessor, ProcessingHost, ProcessorDecorator};
use crate::store::{OutboxFilter, OutboxStore};

/// Counters describing one monitor cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Items returned by the store, siblings included.
    pub fetched: usize,
    /// Items marked RUNNING and persisted in this cycle.
    pub claimed: usize,
    pub submitted_groups: usize,
    /// Groups the executor refused; their items were reset.
    pub rejected_groups: usize,
}

/// The outbox engine.
///
/// - `add` / `add_instant` persist new items
/// - `monitor` claims due items and hands them to the executor
/// - `cleanup` deletes completed items past their retention
/// - `shutdown` drains the executor and resets work that never started
///
/// Built with [`TransactionalOutboxBuilder`](super::TransactionalOutboxBuilder).
/// All entry points take `&self`; share the outbox behind an `Arc`.
pub struct TransactionalOutbox {
    pub(super) registry: Arc<HandlerRegistry>,
    pub(super) factory: OutboxItemFactory,
    pub(super) store: Arc<dyn OutboxStore>,
    pub(super) monitor_locks: Arc<dyn OutboxLocksProvider>,
    pub(super) cleanup_locks: Arc<dyn OutboxLocksProvider>,
    pub(super) instant_publisher: Arc<dyn InstantOutboxPublisher>,
    pub(super) executor: Arc<dyn OutboxExecutor>,
    pub(super) grouping: Arc<dyn GroupingProvider>,
    pub(super) decorators: Vec<Arc<dyn ProcessorDecorator>>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) rerun_after: Duration,
    pub(super) thread_pool_timeout: Duration,
    pub(super) in_shutdown: AtomicBool,
}

impl TransactionalOutbox {
    /// Persist a new item for `item_type`; it runs on the next monitor cycle.
    ///
    /// Call this inside the transaction that makes the business change, so
    /// that both are committed or neither is.
    pub fn add<P: Serialize>(
        &self,
        item_type: impl Into<OutboxType>,
        payload: &P,
    ) -> Result<OutboxItem, OutboxError> {
        let item_type = item_type.into();
        let payload = serde_json::to_value(payload)
            .map_err(|err| OutboxError::Serialization(HandlerError::from(err)))?;
        let item = self.factory.make_scheduled_item(&item_type, &payload)?;
        let item = self.store.insert(item)?;
        debug!(item_id = ?item.id, item_type = %item.item_type, group_id = ?item.group_id, "outbox item added");
        Ok(item)
    }

    /// Like [`add`](Self::add), then notify the instant publisher so the item
    /// can be processed without waiting for the next cycle.
    pub fn add_instant<P: Serialize>(
        &self,
        item_type: impl Into<OutboxType>,
        payload: &P,
    ) -> Result<OutboxItem, OutboxError> {
        let item = self.add(item_type, payload)?;
        self.instant_publisher
            .publish(InstantOutboxEvent::new(item.clone()));
        Ok(item)
    }

    /// Run one monitor cycle over every due item.
    pub fn monitor(&self) -> MonitorReport {
        self.run_monitor(None)
    }

    /// Run a monitor cycle narrowed to the group of item `id`.
    pub fn monitor_item(&self, id: i64) -> MonitorReport {
        self.run_monitor(Some(id))
    }

    /// Delete completed items past their retention.
    ///
    /// Returns the number of deleted items, or `None` when the cycle did not
    /// run (shutting down, lock or store failure).
    pub fn cleanup(&self) -> Option<usize> {
        if self.is_shutting_down() {
            info!("outbox is shutting down; deferring cleanup");
            return None;
        }

        if let Err(err) = self.cleanup_locks.acquire() {
            error!(error = %err, "failed to acquire outbox cleanup lock; skipping cleanup");
            return None;
        }

        let now = self.clock.now();
        let deleted = match panic::catch_unwind(AssertUnwindSafe(|| {
            self.store.delete_completed_items(now)
        })) {
            Ok(Ok(deleted)) => {
                debug!(deleted, "deleted completed outbox items");
                Some(deleted)
            }
            Ok(Err(err)) => {
                error!(error = %err, "failed to delete completed outbox items");
                None
            }
            Err(panic) => {
                error!(panic = %panic_message(panic.as_ref()), "outbox cleanup panicked");
                None
            }
        };

        if let Err(err) = self.cleanup_locks.release() {
            error!(error = %err, "failed to release outbox cleanup lock");
        }
        deleted
    }

    /// Stop monitor and cleanup cycles and drain the executor.
    ///
    /// Waits up to the configured timeout for running groups. Groups that
    /// never started are reset so their items return to PENDING. Only the
    /// first call does any work.
    pub fn shutdown(&self) -> Result<(), OutboxError> {
        if self
            .in_shutdown
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("outbox already shutting down");
            return Ok(());
        }

        info!(timeout = ?self.thread_pool_timeout, "shutting down outbox");
        let drained = self
            .executor
            .shutdown()
            .and_then(|()| self.executor.await_termination(self.thread_pool_timeout));

        match drained {
            Ok(true) => {
                info!("outbox executor terminated");
                Ok(())
            }
            Ok(false) => {
                warn!("outbox executor did not terminate in time; resetting queued groups");
                self.reset_unstarted();
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed while waiting for outbox executor; resetting queued groups");
                self.reset_unstarted();
                Err(err.into())
            }
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.in_shutdown.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    fn run_monitor(&self, id: Option<i64>) -> MonitorReport {
        if self.is_shutting_down() {
            info!(item_id = ?id, "outbox is shutting down; skipping monitor cycle");
            return MonitorReport::default();
        }

        if let Err(err) = self.monitor_locks.acquire() {
            error!(error = %err, "failed to acquire outbox monitor lock; skipping cycle");
            return MonitorReport::default();
        }

        let report = panic::catch_unwind(AssertUnwindSafe(|| self.claim_and_submit(id)))
            .unwrap_or_else(|panic| {
                error!(
                    item_id = ?id,
                    panic = %panic_message(panic.as_ref()),
                    "outbox monitor cycle panicked"
                );
                MonitorReport::default()
            });

        if let Err(err) = self.monitor_locks.release() {
            error!(error = %err, "failed to release outbox monitor lock");
        }
        report
    }

    fn claim_and_submit(&self, id: Option<i64>) -> MonitorReport {
        let mut report = MonitorReport::default();
        let now = self.clock.now();

        let fetched = match self.store.fetch(&OutboxFilter::due_at(now).with_id(id)) {
            Ok(items) => items,
            Err(err) => {
                error!(error = %err, "failed to fetch outbox items");
                return report;
            }
        };
        report.fetched = fetched.len();

        let (eligible, erroneous): (Vec<OutboxItem>, Vec<OutboxItem>) =
            fetched.into_iter().partition(|item| {
                matches!(
                    item.status,
                    OutboxStatus::Pending | OutboxStatus::Running | OutboxStatus::Failed
                )
            });
        for item in &erroneous {
            warn!(item_id = ?item.id, status = %item.status, "erroneously fetched outbox item; ignoring");
        }

        let copies = eligible.iter().map(OutboxItem::snapshot).collect();
        let mut groups = self.grouping.execute(copies);
        if let Some(id) = id {
            groups.retain(|group| group.contains(id));
        }

        let rerun_after = add_duration(now, self.rerun_after);
        for group in &mut groups {
            report.claimed += self.mark_for_processing(group, now, rerun_after);
        }

        for group in groups.into_iter().filter(OutboxItemGroup::has_marked_items) {
            let group_size = group.len();
            let processor = Arc::new(OutboxGroupProcessor::new(
                group,
                Arc::clone(&self.registry),
                Arc::clone(&self.store),
                Arc::clone(&self.clock),
            ));
            let host = Arc::new(ProcessingHost::new(processor, &self.decorators));

            match self.executor.execute(Arc::clone(&host)) {
                Ok(()) => report.submitted_groups += 1,
                Err(err) => {
                    warn!(error = %err, group_size, "outbox group rejected; resetting its items");
                    host.reset();
                    report.rejected_groups += 1;
                }
            }
        }

        if report.claimed > 0 {
            info!(
                fetched = report.fetched,
                claimed = report.claimed,
                submitted_groups = report.submitted_groups,
                rejected_groups = report.rejected_groups,
                "outbox monitor cycle finished"
            );
        }
        report
    }

    /// Mark every eligible item of `group` and persist it. Returns how many
    /// items were claimed.
    ///
    /// Claiming is all or nothing: if one claim cannot be persisted, the
    /// claims already made in the group are reverted and the group is left
    /// for a later cycle, so no item can overtake an earlier sibling.
    fn mark_for_processing(
        &self,
        group: &mut OutboxItemGroup,
        now: DateTime<Utc>,
        rerun_after: DateTime<Utc>,
    ) -> usize {
        let group_size = group.items.len();
        let mut claimed = 0;
        for index in 0..group_size {
            let item = &mut group.items[index];
            let already_marked = item.is_marked_for_processing();
            if !item.prepare_for_processing(now, rerun_after) || already_marked {
                continue;
            }
            match self.store.update(item) {
                Ok(_) => claimed += 1,
                Err(err) => {
                    error!(
                        item_id = ?item.id,
                        group_size,
                        error = %err,
                        "failed to persist outbox item claim; releasing its group"
                    );
                    item.reset();
                    self.release_claims(&mut group.items[..index]);
                    return 0;
                }
            }
        }
        claimed
    }

    /// Revert claims persisted earlier in this cycle.
    fn release_claims(&self, items: &mut [OutboxItem]) {
        for item in items.iter_mut().filter(|item| item.is_marked_for_processing()) {
            if !item.reset() {
                continue;
            }
            if let Err(err) = self.store.update(item) {
                warn!(
                    item_id = ?item.id,
                    error = %err,
                    "failed to revert outbox item claim; it is re-claimed after rerun_after"
                );
            }
        }
    }

    fn reset_unstarted(&self) {
        match self.executor.shutdown_now() {
            Ok(hosts) => {
                if !hosts.is_empty() {
                    info!(groups = hosts.len(), "resetting outbox groups that never started");
                }
                for host in hosts {
                    host.reset();
                }
            }
            Err(err) => error!(error = %err, "failed to drain outbox executor"),
        }
    }
}
