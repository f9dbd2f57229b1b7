//! # Completion collection.
//!
//! Every oversight task sends exactly one [`TaskReport`] when it finishes. Two parties may
//! consume those reports and retire the matching [`ChildTable`] entry:
//!
//! ```text
//! reaping enabled   background reaper task ── owns receiver ──► retire(Collector::Reaper)
//! reaping paused    SyncWait guard (supervisor) ─ owns receiver ─► retire(Collector::SyncWait)
//! ```
//!
//! The receiver lives behind an async mutex. [`Reaper::pause`] clears the enable flag and
//! then takes the mutex, which the background task releases as soon as it observes the
//! flag change. While the returned [`SyncWait`] is alive only the supervisor can receive;
//! dropping it sets the flag again and hands the receiver back. A report is therefore
//! received once, by one side, and a resumed reaper only ever sees reports nobody has read.
use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, MutexGuard, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, trace, warn};

use fanout_model::{Collector, PoolEvent, TaskReport};

use crate::{error::CoreError, state::ChildTable, subscribe::Subscribers};

type Completions = mpsc::UnboundedReceiver<TaskReport>;

pub struct Reaper {
    enabled: watch::Sender<bool>,
    completions: Arc<Mutex<Completions>>,
    table: ChildTable,
    events: Subscribers,
    handle: JoinHandle<()>,
}

impl Reaper {
    /// Starts the background reaper with reaping enabled.
    ///
    /// Returns the sender oversight tasks report through.
    pub fn spawn(
        table: ChildTable,
        events: Subscribers,
    ) -> (Self, mpsc::UnboundedSender<TaskReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (enabled, enabled_rx) = watch::channel(true);
        let completions = Arc::new(Mutex::new(rx));

        let handle = tokio::spawn(reap_loop(
            enabled_rx,
            Arc::clone(&completions),
            table.clone(),
            events.clone(),
        ));

        let reaper = Self {
            enabled,
            completions,
            table,
            events,
            handle,
        };
        (reaper, tx)
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    /// Disables asynchronous reaping and takes exclusive ownership of completions.
    ///
    /// Resolves once the background reaper has let go of the receiver.
    pub async fn pause(&self) -> SyncWait<'_> {
        self.enabled.send_replace(false);
        let completions = self.completions.lock().await;
        trace!(target: "fanout.core.reaper", "asynchronous reaping paused");
        SyncWait {
            reaper: self,
            completions,
        }
    }

    /// Stops the background reaper. Reports still queued are left unread.
    pub async fn shutdown(self) -> Result<(), CoreError> {
        let Reaper {
            enabled, handle, ..
        } = self;
        drop(enabled);
        handle.await.map_err(|e| CoreError::Reaper(e.to_string()))
    }
}

/// Exclusive, synchronous access to completions. Re-enables reaping on drop.
pub struct SyncWait<'a> {
    reaper: &'a Reaper,
    completions: MutexGuard<'a, Completions>,
}

impl SyncWait<'_> {
    /// Blocks until one task finishes and retires its entry.
    pub async fn wait_one(&mut self) -> Result<TaskReport, CoreError> {
        let report = self.completions.recv().await.ok_or_else(|| {
            CoreError::CompletionChannelClosed {
                live: self.reaper.table.len(),
            }
        })?;
        collect(
            &self.reaper.table,
            &self.reaper.events,
            &report,
            Collector::SyncWait,
        );
        Ok(report)
    }
}

impl Drop for SyncWait<'_> {
    fn drop(&mut self) {
        self.reaper.enabled.send_replace(true);
        trace!(target: "fanout.core.reaper", "asynchronous reaping resumed");
    }
}

async fn reap_loop(
    mut enabled: watch::Receiver<bool>,
    completions: Arc<Mutex<Completions>>,
    table: ChildTable,
    events: Subscribers,
) {
    loop {
        if !wait_until(&mut enabled, true).await {
            break;
        }

        let mut rx = completions.lock().await;
        tokio::select! {
            biased;

            open = wait_until(&mut enabled, false) => {
                if !open {
                    break;
                }
            }
            report = rx.recv() => match report {
                Some(report) => collect(&table, &events, &report, Collector::Reaper),
                None => break,
            },
        }
    }
    trace!(target: "fanout.core.reaper", "reaper stopped");
}

/// Waits for the flag to read `want`. `false` once the supervisor side is gone.
async fn wait_until(enabled: &mut watch::Receiver<bool>, want: bool) -> bool {
    enabled.wait_for(|on| *on == want).await.is_ok()
}

fn collect(table: &ChildTable, events: &Subscribers, report: &TaskReport, by: Collector) {
    let Some(entry) = table.retire(report) else {
        warn!(target: "fanout.core.reaper", task = %report.id, by = by.as_str(), "completion for unknown task");
        return;
    };
    let elapsed: Duration = entry.started_at.elapsed();
    let live = table.len();

    debug!(
        target: "fanout.core.reaper",
        task = %report.id,
        by = by.as_str(),
        attempts = report.attempts(),
        outcome = %report.outcome,
        live,
        "task collected"
    );
    events.publish(PoolEvent::TaskCollected {
        report: report.clone(),
        by,
        elapsed,
        live,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use fanout_model::{ChildEntry, ExitOutcome, Invocation, TaskId, Verdict};

    use crate::subscribe::Subscribe;

    #[derive(Default)]
    struct Recorder {
        collected: StdMutex<Vec<(TaskId, Collector)>>,
    }

    impl Subscribe for Recorder {
        fn on_event(&self, event: &PoolEvent) {
            if let PoolEvent::TaskCollected { report, by, .. } = event {
                self.collected.lock().unwrap().push((report.id, *by));
            }
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn report(n: u64) -> TaskReport {
        TaskReport {
            id: TaskId::new(n),
            reruns: 0,
            outcome: ExitOutcome::Exited(0),
            verdict: Verdict::Succeeded,
        }
    }

    fn launch(table: &ChildTable, n: u64) {
        table.insert(ChildEntry::launched(TaskId::new(n), Invocation::default()));
    }

    async fn settle(table: &ChildTable) {
        for _ in 0..200 {
            if table.is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn background_reaper_collects_while_enabled() {
        let table = ChildTable::new();
        let rec = Arc::new(Recorder::default());
        let (reaper, tx) = Reaper::spawn(table.clone(), Subscribers::new(vec![rec.clone()]));

        launch(&table, 1);
        tx.send(report(1)).unwrap();
        settle(&table).await;

        assert!(table.is_empty());
        assert_eq!(
            rec.collected.lock().unwrap().as_slice(),
            &[(TaskId::new(1), Collector::Reaper)]
        );
        reaper.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn paused_reaper_leaves_completions_to_sync_wait() {
        let table = ChildTable::new();
        let rec = Arc::new(Recorder::default());
        let (reaper, tx) = Reaper::spawn(table.clone(), Subscribers::new(vec![rec.clone()]));

        launch(&table, 1);
        launch(&table, 2);

        {
            let mut sync = reaper.pause().await;
            assert!(!reaper.is_enabled());

            tx.send(report(1)).unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(table.contains(&TaskId::new(1)), "reaper must not collect while paused");

            let got = sync.wait_one().await.unwrap();
            assert_eq!(got.id, TaskId::new(1));
            assert!(!table.contains(&TaskId::new(1)));
        }
        assert!(reaper.is_enabled());

        tx.send(report(2)).unwrap();
        settle(&table).await;
        assert!(table.is_empty());

        assert_eq!(
            rec.collected.lock().unwrap().as_slice(),
            &[
                (TaskId::new(1), Collector::SyncWait),
                (TaskId::new(2), Collector::Reaper)
            ]
        );
        reaper.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn every_completion_is_collected_exactly_once() {
        let table = ChildTable::new();
        let rec = Arc::new(Recorder::default());
        let (reaper, tx) = Reaper::spawn(table.clone(), Subscribers::new(vec![rec.clone()]));

        for n in 1..=50 {
            launch(&table, n);
        }
        let sender = tokio::spawn(async move {
            for n in 1..=50 {
                tx.send(report(n)).unwrap();
                tokio::task::yield_now().await;
            }
            tx
        });

        let mut synced = 0;
        while synced < 10 {
            let mut sync = reaper.pause().await;
            if table.is_empty() {
                break;
            }
            sync.wait_one().await.unwrap();
            synced += 1;
        }

        let _tx = sender.await.unwrap();
        settle(&table).await;
        assert!(table.is_empty());

        let collected = rec.collected.lock().unwrap();
        assert_eq!(collected.len(), 50);
        let mut ids: Vec<u64> = collected.iter().map(|(id, _)| id.get()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        drop(collected);

        assert_eq!(table.stats().succeeded, 50);
        reaper.shutdown().await.unwrap();
    }
}
