//! Background thread running scoped monitor cycles for instant items.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ExecutorError;
use crate::instant::InstantOutboxEvent;
use crate::outbox::TransactionalOutbox;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Consumes the receiver of a
/// [`ChannelInstantPublisher`](crate::ChannelInstantPublisher) and calls
/// `monitor_item` for every event.
///
/// The thread holds the outbox weakly, since the outbox owns the sending
/// half of the channel. It exits when stopped, when the channel closes, or
/// when the outbox is dropped.
pub struct InstantProcessingThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<usize>>,
}

impl InstantProcessingThread {
    pub fn spawn(
        outbox: Weak<TransactionalOutbox>,
        events: Receiver<InstantOutboxEvent>,
    ) -> Result<Self, ExecutorError> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("outbox-instant".to_string())
            .spawn(move || {
                let mut processed = 0;
                while !stop_flag.load(Ordering::SeqCst) {
                    let event = match events.recv_timeout(POLL_INTERVAL) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    };
                    let Some(outbox) = outbox.upgrade() else {
                        break;
                    };
                    match event.item_id() {
                        Some(id) => {
                            outbox.monitor_item(id);
                            processed += 1;
                        }
                        None => warn!("instant outbox event without item id; ignoring"),
                    }
                }
                debug!(processed, "instant outbox thread stopped");
                processed
            })
            .map_err(|err| ExecutorError::Spawn(err.to_string()))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it. Returns the number of events handled.
    pub fn stop(mut self) -> usize {
        self.stop.store(true, Ordering::SeqCst);
        self.handle
            .take()
            .map(|handle| handle.join().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl Drop for InstantProcessingThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}
