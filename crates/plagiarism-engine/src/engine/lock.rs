//! Per-task mutual exclusion for analysis cycles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async mutex per task id.
///
/// Entries nobody holds or waits on are pruned whenever a lock is acquired.
#[derive(Default)]
pub struct TaskLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TaskLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other cycle holds `task_id`.
    pub async fn acquire(&self, task_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            // A poisoned map only means another thread panicked mid-insert;
            // the map itself is still consistent.
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(task_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of task ids currently tracked.
    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
