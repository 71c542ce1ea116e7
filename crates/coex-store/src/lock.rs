//! Per-execution exclusive locks.
//!
//! Each execution id gets an async mutex created on first use. A holder may
//! await remote calls while holding it; a second contender for the same id
//! waits and then re-reads the row. Slots are removed once nobody holds or
//! waits on them.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;
use tracing::trace;

use crate::types::ExecutionRecord;

type Slot = Arc<tokio::sync::Mutex<()>>;

#[derive(Default)]
pub(crate) struct LockTable {
    slots: Mutex<HashMap<i64, Slot>>,
}

impl LockTable {
    pub(crate) async fn acquire(self: &Arc<Self>, id: i64) -> RecordGuard {
        let slot = Arc::clone(self.slots.lock().entry(id).or_default());
        let guard = slot.lock_owned().await;
        trace!(execution_id = id, "Execution lock acquired");
        RecordGuard {
            id,
            table: Arc::clone(self),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Holds the lock for one execution id until dropped.
pub(crate) struct RecordGuard {
    id: i64,
    table: Arc<LockTable>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        // The map lock is taken before releasing so no new contender can
        // clone the slot between the release and the count check.
        let mut slots = self.table.slots.lock();
        self.guard.take();
        if slots
            .get(&self.id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.id);
        }
        trace!(execution_id = self.id, "Execution lock released");
    }
}

/// An execution record read while holding its exclusive lock.
///
/// Mutate through `DerefMut`, then pass to
/// [`ExecutionStore::commit`](crate::ExecutionStore::commit). Dropping it
/// (or calling [`rollback`](Self::rollback)) releases the lock without
/// writing anything.
pub struct LockedExecution {
    record: ExecutionRecord,
    guard: RecordGuard,
}

impl LockedExecution {
    pub(crate) fn new(record: ExecutionRecord, guard: RecordGuard) -> Self {
        Self { record, guard }
    }

    /// Release the lock without persisting changes.
    pub fn rollback(self) {
        trace!(execution_id = self.guard.id, "Rolling back execution");
    }

    pub(crate) fn into_parts(self) -> (ExecutionRecord, RecordGuard) {
        (self.record, self.guard)
    }
}

impl Deref for LockedExecution {
    type Target = ExecutionRecord;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl DerefMut for LockedExecution {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.record
    }
}

impl std::fmt::Debug for LockedExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockedExecution")
            .field("id", &self.record.id)
            .field("status", &self.record.status)
            .finish()
    }
}
