use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error};

use super::OutboxExecutor;
use crate::error::ExecutorError;
use crate::processing::ProcessingHost;

struct PoolState {
    queue: VecDeque<Arc<ProcessingHost>>,
    shutdown: bool,
    active: usize,
    live_workers: usize,
}

struct Shared {
    state: Mutex<PoolState>,
    available: Condvar,
    terminated: Condvar,
    capacity: Option<usize>,
}

impl Shared {
    fn state(&self, operation: &'static str) -> Result<MutexGuard<'_, PoolState>, ExecutorError> {
        self.state
            .lock()
            .map_err(|_| ExecutorError::Poisoned(operation))
    }
}

/// A fixed set of named worker threads consuming a FIFO queue.
///
/// With a `capacity`, at most that many tasks may wait in the queue; further
/// submissions are rejected until workers catch up.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    pub fn new(
        size: usize,
        thread_name_prefix: &str,
        capacity: Option<usize>,
    ) -> Result<Self, ExecutorError> {
        if size == 0 {
            return Err(ExecutorError::Spawn(
                "thread pool size must be at least 1".to_string(),
            ));
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                shutdown: false,
                active: 0,
                live_workers: 0,
            }),
            available: Condvar::new(),
            terminated: Condvar::new(),
            capacity,
        });

        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            shared.state("spawn")?.live_workers += 1;
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("{thread_name_prefix}-{index}"))
                .spawn(move || work(worker_shared));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    if let Ok(mut state) = shared.state("spawn") {
                        state.live_workers -= 1;
                        state.shutdown = true;
                    }
                    shared.available.notify_all();
                    return Err(ExecutorError::Spawn(err.to_string()));
                }
            }
        }

        Ok(WorkerPool {
            shared,
            workers: Mutex::new(workers),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Tasks waiting for a worker.
    pub fn queued(&self) -> Result<usize, ExecutorError> {
        Ok(self.shared.state("queued")?.queue.len())
    }

    /// Tasks currently running.
    pub fn active(&self) -> Result<usize, ExecutorError> {
        Ok(self.shared.state("active")?.active)
    }

    pub fn is_shutdown(&self) -> Result<bool, ExecutorError> {
        Ok(self.shared.state("is_shutdown")?.shutdown)
    }

    /// Shut down and wait for every worker thread to exit.
    pub fn join(&self) -> Result<(), ExecutorError> {
        self.shutdown()?;
        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self
                .workers
                .lock()
                .map_err(|_| ExecutorError::Poisoned("join"))?;
            workers.drain(..).collect()
        };
        for handle in handles {
            if handle.join().is_err() {
                error!("outbox worker thread panicked");
            }
        }
        Ok(())
    }
}

impl OutboxExecutor for WorkerPool {
    fn execute(&self, host: Arc<ProcessingHost>) -> Result<(), ExecutorError> {
        let mut state = self.shared.state("execute")?;
        if state.shutdown {
            return Err(ExecutorError::Rejected("executor is shut down".to_string()));
        }
        if let Some(capacity) = self.shared.capacity {
            if state.queue.len() >= capacity {
                return Err(ExecutorError::Rejected(format!(
                    "queue is full ({capacity} tasks waiting)"
                )));
            }
        }
        state.queue.push_back(host);
        self.shared.available.notify_one();
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ExecutorError> {
        let mut state = self.shared.state("shutdown")?;
        state.shutdown = true;
        self.shared.available.notify_all();
        Ok(())
    }

    fn await_termination(&self, timeout: Duration) -> Result<bool, ExecutorError> {
        let state = self.shared.state("await_termination")?;
        let (state, _) = self
            .shared
            .terminated
            .wait_timeout_while(state, timeout, |state| {
                !(state.shutdown && state.live_workers == 0)
            })
            .map_err(|_| ExecutorError::Poisoned("await_termination"))?;
        Ok(state.shutdown && state.live_workers == 0)
    }

    fn shutdown_now(&self) -> Result<Vec<Arc<ProcessingHost>>, ExecutorError> {
        let mut state = self.shared.state("shutdown_now")?;
        state.shutdown = true;
        let drained: Vec<Arc<ProcessingHost>> = state.queue.drain(..).collect();
        self.shared.available.notify_all();
        Ok(drained)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state("drop") {
            state.shutdown = true;
        }
        self.shared.available.notify_all();
        // Workers finish queued tasks and exit on their own.
    }
}

fn work(shared: Arc<Shared>) {
    loop {
        let host = {
            let Ok(mut state) = shared.state("worker") else {
                break;
            };
            loop {
                if let Some(host) = state.queue.pop_front() {
                    state.active += 1;
                    break Some(host);
                }
                if state.shutdown {
                    break None;
                }
                state = match shared.available.wait(state) {
                    Ok(state) => state,
                    Err(_) => return,
                };
            }
        };

        let Some(host) = host else {
            break;
        };
        host.run();

        match shared.state("worker") {
            Ok(mut state) => state.active -= 1,
            Err(_) => return,
        }
    }

    if let Ok(mut state) = shared.state("worker exit") {
        state.live_workers -= 1;
        debug!(live_workers = state.live_workers, "outbox worker exited");
    }
    shared.terminated.notify_all();
}
