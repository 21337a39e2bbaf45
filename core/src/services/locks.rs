//! Per-subject mutual exclusion for user-triggered operations and sweep mutations.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Entries are dropped once nobody holds or waits on them
#[derive(Default)]
pub struct SubjectLocks {
    locks: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl SubjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `subject_id`
    pub async fn lock(&self, subject_id: &str) -> OwnedMutexGuard<()> {
        let mutex = self.mutex_for(subject_id);
        mutex.lock_owned().await
    }

    fn mutex_for(&self, subject_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = locks.get(subject_id).and_then(Weak::upgrade) {
            return existing;
        }

        locks.retain(|_, weak| weak.strong_count() > 0);
        let mutex = Arc::new(AsyncMutex::new(()));
        locks.insert(subject_id.to_string(), Arc::downgrade(&mutex));
        mutex
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Subjects with a long-running operation underway outside their lock
#[derive(Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `subject_id` busy; `None` if it already is
    pub fn claim(&self, subject_id: &str) -> Option<InFlightClaim> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(subject_id.to_string()) {
            return None;
        }
        Some(InFlightClaim {
            active: self.active.clone(),
            subject_id: subject_id.to_string(),
        })
    }
}

/// Releases the subject when dropped
pub struct InFlightClaim {
    active: Arc<Mutex<HashSet<String>>>,
    subject_id: String,
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.subject_id);
    }
}
