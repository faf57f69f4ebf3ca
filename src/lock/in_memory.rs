use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

use super::{LockError, OutboxLocksProvider};

/// In-memory lock backed by `Mutex<bool>` + `Condvar`.
pub struct InMemoryLocksProvider {
    id: i64,
    state: Mutex<bool>,
    wake: Condvar,
}

impl InMemoryLocksProvider {
    pub fn new(id: i64) -> Self {
        InMemoryLocksProvider {
            id,
            state: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Try to acquire the lock without blocking.
    /// Returns `Ok(true)` if acquired, `Ok(false)` if already held.
    pub fn try_acquire(&self) -> Result<bool, LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        if *locked {
            Ok(false)
        } else {
            *locked = true;
            Ok(true)
        }
    }

    pub fn is_locked(&self) -> Result<bool, LockError> {
        let locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        Ok(*locked)
    }
}

impl OutboxLocksProvider for InMemoryLocksProvider {
    fn acquire(&self) -> Result<(), LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        while *locked {
            locked = self
                .wake
                .wait(locked)
                .map_err(|e| LockError::Poisoned(e.to_string()))?;
        }
        *locked = true;
        Ok(())
    }

    fn release(&self) -> Result<(), LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        if !*locked {
            return Err(LockError::ReleaseFailed(format!(
                "lock {} is not held",
                self.id
            )));
        }
        *locked = false;
        self.wake.notify_one();
        Ok(())
    }
}

/// Hands out one [`InMemoryLocksProvider`] per lock id.
///
/// Repeated lookups of the same id return the same `Arc`, so two outbox
/// instances built from one manager contend on the same monitor lock.
pub struct InMemoryLockManager {
    locks: Mutex<HashMap<i64, Arc<InMemoryLocksProvider>>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        InMemoryLockManager {
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider(&self, id: i64) -> Result<Arc<InMemoryLocksProvider>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("lock manager map poisoned".into()))?;
        Ok(locks
            .entry(id)
            .or_insert_with(|| Arc::new(InMemoryLocksProvider::new(id)))
            .clone())
    }
}

impl Default for InMemoryLockManager {
    fn default() -> Self {
        Self::new()
    }
}
