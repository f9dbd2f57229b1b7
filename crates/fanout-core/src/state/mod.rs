use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use fanout_model::{ChildEntry, TaskId, TaskReport};

/// Live-task bookkeeping shared by the supervisor and the reaper.
///
/// An entry exists exactly while its oversight task is in flight.
#[derive(Clone, Default)]
pub struct ChildTable {
    inner: Arc<RwLock<ChildTableInner>>,
}

#[derive(Default)]
struct ChildTableInner {
    entries: HashMap<TaskId, ChildEntry>,
    /// High-water mark of `entries.len()`.
    peak: usize,
    succeeded: u64,
    failed: u64,
}

/// Point-in-time counters of a [`ChildTable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableStats {
    pub live: usize,
    pub peak: usize,
    pub succeeded: u64,
    pub failed: u64,
}

impl ChildTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ChildTableInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChildTableInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a launched task. Returns the live count after insertion.
    pub fn insert(&self, entry: ChildEntry) -> usize {
        let mut inner = self.write();
        inner.entries.insert(entry.id, entry);
        let live = inner.entries.len();
        inner.peak = inner.peak.max(live);
        live
    }

    /// Removes a task without recording its outcome.
    pub fn remove(&self, id: &TaskId) -> Option<ChildEntry> {
        self.write().entries.remove(id)
    }

    /// Removes a finished task and tallies its outcome.
    ///
    /// The returned entry carries the task's final rerun count.
    /// Returns `None` if the entry was already gone, in which case nothing is tallied.
    pub fn retire(&self, report: &TaskReport) -> Option<ChildEntry> {
        let mut inner = self.write();
        let mut entry = inner.entries.remove(&report.id)?;
        entry.rerun_count = report.reruns;
        if report.succeeded() {
            inner.succeeded += 1;
        } else {
            inner.failed += 1;
        }
        Some(entry)
    }

    pub fn get(&self, id: &TaskId) -> Option<ChildEntry> {
        self.read().entries.get(id).cloned()
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.read().entries.contains_key(id)
    }

    /// Ids of live tasks in launch order.
    pub fn ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.read().entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    pub fn peak(&self) -> usize {
        self.read().peak
    }

    pub fn stats(&self) -> TableStats {
        let inner = self.read();
        TableStats {
            live: inner.entries.len(),
            peak: inner.peak,
            succeeded: inner.succeeded,
            failed: inner.failed,
        }
    }
}
