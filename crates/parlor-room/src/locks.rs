//! Per-room serialization within one process.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per room id.
///
/// Every read-modify-write of a room (and of its game state) in this
/// process runs while holding the room's guard, so two local sessions
/// acting on the same room can't lose each other's update. Writers in
/// other processes are not covered.
#[derive(Debug, Default)]
pub struct RoomLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `room_id`.
    pub async fn lock(&self, room_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out first; holding a DashMap shard guard across the
        // await would block every room hashed to that shard.
        let mutex = self
            .locks
            .entry(room_id.to_owned())
            .or_default()
            .clone();
        mutex.lock_owned().await
    }

    /// Drops the entry for a room nobody is holding or waiting on.
    pub fn forget(&self, room_id: &str) {
        self.locks
            .remove_if(room_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
