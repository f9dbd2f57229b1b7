//! # Worker pool supervisor.
//!
//! Single flow of control; the only component allowed to launch oversight tasks.
//!
//! ```text
//! loop:
//!   record  = source.next()           ── None ──► drain
//!   inv     = expand(template, record)
//!   sleep(delay)                         (when delay > 0)
//!   table.insert(entry); spawn(runner.run(id, inv))
//!   live == max_parallel?
//!     pause reaper ─► wait_one while still full ─► resume reaper
//! drain:
//!   pause reaper ─► wait_one until table is empty
//! ```
//!
//! The entry is inserted before the task is spawned, so a completion can never arrive
//! for an id the table has not seen yet.
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, trace};

use fanout_model::{
    ChildEntry, CommandTemplate, ExitOutcome, Invocation, Policy, PoolEvent, TaskId, TaskReport,
    Verdict,
};

use crate::{
    error::CoreError,
    expand::expand,
    reaper::Reaper,
    runner::Runner,
    source::LineSource,
    state::ChildTable,
    subscribe::{Subscribe, Subscribers},
};

/// Totals of one supervisor run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub launched: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Highest number of simultaneously live tasks observed.
    pub peak_live: usize,
}

pub struct Supervisor {
    policy: Arc<Policy>,
    template: CommandTemplate,
    runner: Arc<dyn Runner>,
    events: Subscribers,
}

impl Supervisor {
    pub fn new(policy: Arc<Policy>, template: CommandTemplate, runner: Arc<dyn Runner>) -> Self {
        Self {
            policy,
            template,
            runner,
            events: Subscribers::default(),
        }
    }

    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.events = Subscribers::new(subscribers);
        self
    }

    /// Consumes `source` and returns once every launched task has finished.
    #[instrument(level = "debug", skip_all, fields(runner = self.runner.name(), max_parallel = self.policy.max_parallel()))]
    pub async fn run(&self, source: &mut LineSource) -> Result<RunSummary, CoreError> {
        let max_parallel = self.policy.max_parallel();
        let delay = self.policy.delay();

        let table = ChildTable::new();
        let (reaper, done) = Reaper::spawn(table.clone(), self.events.clone());

        let mut next_id = TaskId::new(1);
        let mut launched: u64 = 0;

        while let Some(record) = source.next().await {
            let invocation = expand(&self.template, &record);
            trace!(target: "fanout.core.supervisor", fields = record.len(), argv = ?invocation.argv(), "record expanded");

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let live = self.launch(next_id, invocation, &table, &done);
            next_id = next_id.next();
            launched += 1;

            if live >= max_parallel {
                self.events.publish(PoolEvent::PoolFull { live });
                let mut sync = reaper.pause().await;
                // The reaper may have collected something before it let go.
                while table.len() >= max_parallel {
                    sync.wait_one().await?;
                }
            }
        }

        let remaining = table.len();
        debug!(target: "fanout.core.supervisor", launched, remaining, "input exhausted; draining");
        self.events.publish(PoolEvent::DrainStarted { live: remaining });
        {
            let mut sync = reaper.pause().await;
            while !table.is_empty() {
                sync.wait_one().await?;
            }
        }
        reaper.shutdown().await?;
        self.events.publish(PoolEvent::DrainFinished { launched });

        let stats = table.stats();
        let summary = RunSummary {
            launched,
            succeeded: stats.succeeded,
            failed: stats.failed,
            peak_live: stats.peak,
        };
        info!(
            target: "fanout.core.supervisor",
            launched = summary.launched,
            succeeded = summary.succeeded,
            failed = summary.failed,
            peak_live = summary.peak_live,
            "all tasks finished"
        );
        Ok(summary)
    }

    /// Inserts the entry, then starts the oversight task. Returns the live count.
    fn launch(
        &self,
        id: TaskId,
        invocation: Invocation,
        table: &ChildTable,
        done: &mpsc::UnboundedSender<TaskReport>,
    ) -> usize {
        let live = table.insert(ChildEntry::launched(id, invocation.clone()));
        self.events.publish(PoolEvent::TaskLaunched {
            id,
            invocation: invocation.clone(),
            live,
        });

        let runner = Arc::clone(&self.runner);
        let done = done.clone();

        tokio::spawn(async move {
            let task = tokio::spawn(async move { runner.run(id, invocation).await });
            let report = match task.await {
                Ok(report) => report,
                Err(e) => {
                    error!(target: "fanout.core.supervisor", task = %id, error = %e, "oversight task aborted");
                    TaskReport {
                        id,
                        reruns: 0,
                        outcome: ExitOutcome::SpawnFailed(format!("oversight task aborted: {e}")),
                        verdict: Verdict::FilterFailed,
                    }
                }
            };
            // Receiver lives until the drain has seen every launched task.
            let _ = done.send(report);
        });

        trace!(target: "fanout.core.supervisor", task = %id, live, "task launched");
        live
    }
}
