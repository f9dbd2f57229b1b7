use std::time::Duration;

use crate::{Invocation, TaskId, TaskReport};

/// Which side of the pool consumed a completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collector {
    /// Background reaper, while asynchronous reaping is enabled.
    Reaper,
    /// Supervisor blocked on a full pool or draining.
    SyncWait,
}

impl Collector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collector::Reaper => "reaper",
            Collector::SyncWait => "sync-wait",
        }
    }
}

/// Pool lifecycle notifications fanned out to subscribers.
#[derive(Clone, Debug)]
pub enum PoolEvent {
    /// Oversight task launched and its entry inserted.
    TaskLaunched {
        id: TaskId,
        invocation: Invocation,
        live: usize,
    },
    /// Finished task removed from bookkeeping.
    TaskCollected {
        report: TaskReport,
        by: Collector,
        elapsed: Duration,
        live: usize,
    },
    /// Live entries reached `max_parallel`; intake blocks.
    PoolFull { live: usize },
    /// Input exhausted; waiting out the remaining tasks.
    DrainStarted { live: usize },
    /// Every task finished.
    DrainFinished { launched: u64 },
}

impl PoolEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PoolEvent::TaskLaunched { .. } => "task-launched",
            PoolEvent::TaskCollected { .. } => "task-collected",
            PoolEvent::PoolFull { .. } => "pool-full",
            PoolEvent::DrainStarted { .. } => "drain-started",
            PoolEvent::DrainFinished { .. } => "drain-finished",
        }
    }
}
