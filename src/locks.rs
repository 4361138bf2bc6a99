use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::database::Thing;

type LockMap = DashMap<Thing, Arc<Mutex<()>>>;

/// One async mutex per record, so read-modify-write cycles on the same record run one at a time.
///
/// A record's entry only lives while some task holds or waits for its lock.
#[derive(Debug, Clone, Default)]
pub struct RecordLocks {
    locks: Arc<LockMap>,
}

impl RecordLocks {
    /// Waits until no other task holds the lock for `id`.
    pub async fn lock(&self, id: &Thing) -> RecordGuard {
        let lock = self.locks.entry(id.clone()).or_default().clone();
        let guard = lock.lock_owned().await;

        RecordGuard {
            id: id.clone(),
            locks: self.locks.clone(),
            guard: Some(guard),
        }
    }
}

/// Holds a record's lock, releasing it and evicting unused entries on drop.
#[derive(Debug)]
pub struct RecordGuard {
    id: Thing,
    locks: Arc<LockMap>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Only the map's own handle left means nobody holds or awaits this lock.
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
