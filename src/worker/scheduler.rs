//! Background thread driving periodic monitor and cleanup cycles.

use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::ExecutorError;
use crate::outbox::TransactionalOutbox;

/// Statistics from the scheduler thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchedulerStats {
    pub monitor_cycles: usize,
    pub items_claimed: usize,
    pub groups_rejected: usize,
    pub cleanup_cycles: usize,
    pub items_deleted: usize,
}

/// A background thread that calls `monitor()` every `monitor_interval` and
/// `cleanup()` every `cleanup_interval`.
///
/// ## Example
///
/// ```ignore
/// let outbox = Arc::new(builder.build()?);
/// let scheduler = OutboxSchedulerThread::spawn(
///     Arc::clone(&outbox),
///     Duration::from_secs(1),
///     Some(Duration::from_secs(3600)),
/// )?;
///
/// // ... do work ...
///
/// let stats = scheduler.stop();
/// outbox.shutdown()?;
/// ```
pub struct OutboxSchedulerThread {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<SchedulerStats>>,
}

impl OutboxSchedulerThread {
    pub fn spawn(
        outbox: Arc<TransactionalOutbox>,
        monitor_interval: Duration,
        cleanup_interval: Option<Duration>,
    ) -> Result<Self, ExecutorError> {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::Builder::new()
            .name("outbox-scheduler".to_string())
            .spawn(move || {
                let mut stats = SchedulerStats::default();
                let mut last_cleanup = Instant::now();
                info!(?monitor_interval, ?cleanup_interval, "outbox scheduler started");

                loop {
                    let report = outbox.monitor();
                    stats.monitor_cycles += 1;
                    stats.items_claimed += report.claimed;
                    stats.groups_rejected += report.rejected_groups;

                    if let Some(interval) = cleanup_interval {
                        if last_cleanup.elapsed() >= interval {
                            last_cleanup = Instant::now();
                            if let Some(deleted) = outbox.cleanup() {
                                stats.cleanup_cycles += 1;
                                stats.items_deleted += deleted;
                            }
                        }
                    }

                    match stop_rx.recv_timeout(monitor_interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                debug!(?stats, "outbox scheduler stopped");
                stats
            })
            .map_err(|err| ExecutorError::Spawn(err.to_string()))?;

        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Signal the thread to stop and wait for it to finish.
    /// Returns the scheduler statistics.
    pub fn stop(mut self) -> SchedulerStats {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap_or_default()
        } else {
            SchedulerStats::default()
        }
    }

    /// Signal the thread to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for OutboxSchedulerThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
