//! Process-wide keyed lock table

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Serializes read-modify-write sequences on one shared remote field.
///
/// Keys are remote object IDs (e.g. a connection ID). The guard returned by
/// [`KeyedLocks::lock`] releases the key when dropped, on every exit path.
/// Only callers inside this process are coordinated.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        debug!("Waiting for lock on {}", key);
        mutex.lock_owned().await
    }

    /// Number of keys ever locked
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
