use std::time::Instant;

use crate::{Invocation, TaskId};

/// Bookkeeping for one in-flight oversight task.
///
/// Exists only while the task is alive; removed by whichever collector sees it finish first.
#[derive(Clone, Debug)]
pub struct ChildEntry {
    pub id: TaskId,
    pub started_at: Instant,
    /// Reruns performed. `0` while the task is live (reruns happen inside it);
    /// set from the task's report when the entry is retired.
    pub rerun_count: u32,
    pub invocation: Invocation,
}

impl ChildEntry {
    pub fn launched(id: TaskId, invocation: Invocation) -> Self {
        Self {
            id,
            started_at: Instant::now(),
            rerun_count: 0,
            invocation,
        }
    }
}
