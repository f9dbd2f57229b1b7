//! # Oversight of one invocation.
//!
//! Runs the invocation until it succeeds or its rerun budget is spent:
//!
//! ```text
//! Spawning ─► Running ─► Succeeded ──────────────────────────► Finished
//!    ▲                 ├► TimedOut ───┐
//!    │                 └► FilterFailed┴► budget left? ─ no ──► Finished
//!    └──── Rerunning (rerun_count += 1, sleep delay) ◄─ yes
//! ```
//!
//! - A timed-out child gets SIGTERM and is reaped before the outcome is evaluated.
//! - Spawn failures are outcomes like any other exit status; they never escape this task.
//! - With `verbose`, every spawn logs `<words> # <rerun_count>` and every evaluation
//!   logs `<words> : <status>` on the `fanout.verbose` target.
use std::process::ExitStatus;

use tracing::{debug, info, trace, warn};

use fanout_model::{ExitOutcome, Invocation, Policy, TaskId, TaskReport};

use crate::util::{build_command, kill_graceful};

const VERBOSE: &str = "fanout.verbose";

/// Runs `invocation` through as many attempts as `policy` allows and reports the last one.
pub async fn oversee(policy: &Policy, id: TaskId, invocation: &Invocation) -> TaskReport {
    let mut rerun_count: u32 = 0;

    loop {
        if policy.verbose() {
            info!(target: VERBOSE, "{invocation} # {rerun_count}");
        }

        let outcome = attempt(policy, id, invocation).await;
        let verdict = outcome.verdict(policy.exit_filter());

        if policy.verbose() {
            info!(target: VERBOSE, "{invocation} : {outcome}");
        }

        if !verdict.is_failure() || !policy.should_rerun(rerun_count) {
            debug!(
                target: "fanout.exec.oversight",
                task = %id,
                reruns = rerun_count,
                %outcome,
                ?verdict,
                "finished"
            );
            return TaskReport {
                id,
                reruns: rerun_count,
                outcome,
                verdict,
            };
        }

        rerun_count += 1;
        debug!(target: "fanout.exec.oversight", task = %id, rerun = rerun_count, %outcome, ?verdict, "rerun scheduled");

        let delay = policy.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// One spawn / wait cycle.
async fn attempt(policy: &Policy, id: TaskId, invocation: &Invocation) -> ExitOutcome {
    let mut cmd = match build_command(invocation, policy.use_shell()) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!(target: "fanout.exec.oversight", task = %id, error = %e, "cannot build command");
            return ExitOutcome::SpawnFailed(e.to_string());
        }
    };

    trace!(target: "fanout.exec.oversight", task = %id, argv = ?invocation.argv(), shell = policy.use_shell(), "spawn");
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(target: "fanout.exec.oversight", task = %id, error = %e, "spawn failed");
            return ExitOutcome::SpawnFailed(e.to_string());
        }
    };

    let waited = match policy.timeout() {
        None => child.wait().await,
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(waited) => waited,
            Err(_elapsed) => {
                debug!(target: "fanout.exec.oversight", task = %id, timeout_ms = limit.as_millis() as u64, "timeout hit; terminating child");
                if let Err(e) = kill_graceful(&mut child).await {
                    warn!(target: "fanout.exec.oversight", task = %id, error = %e, "reaping timed-out child failed");
                }
                return ExitOutcome::TimedOut;
            }
        },
    };

    match waited {
        Ok(status) => outcome_of(status),
        Err(e) => {
            warn!(target: "fanout.exec.oversight", task = %id, error = %e, "wait failed");
            ExitOutcome::SpawnFailed(format!("wait: {e}"))
        }
    }
}

fn outcome_of(status: ExitStatus) -> ExitOutcome {
    if let Some(code) = status.code() {
        return ExitOutcome::Exited(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return ExitOutcome::Signaled(sig);
        }
    }
    ExitOutcome::Exited(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::{
        io,
        path::{Path, PathBuf},
        sync::{Arc, Mutex},
        time::{Duration, Instant},
    };

    use fanout_model::{SPAWN_FAILED_STATUS, Verdict};

    fn argv(words: &[&str]) -> Invocation {
        Invocation::new(words.iter().map(|w| w.to_string()).collect())
    }

    fn scratch() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fanout-exec-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn lines(path: &Path) -> usize {
        std::fs::read_to_string(path)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn success_finishes_without_rerun() {
        let policy = Policy::builder().max_parallel(1).must_equal(Some(0)).build().unwrap();
        let report = oversee(&policy, TaskId::new(1), &argv(&["true"])).await;

        assert_eq!(report.reruns, 0);
        assert_eq!(report.outcome, ExitOutcome::Exited(0));
        assert_eq!(report.verdict, Verdict::Succeeded);
    }

    #[tokio::test]
    async fn rerun_budget_bounds_attempts() {
        let dir = scratch();
        let log = dir.join("attempts");
        let script = format!("echo x >> {}; exit 1", log.display());

        let policy = Policy::builder()
            .max_parallel(1)
            .max_reruns(2)
            .must_equal(Some(0))
            .build()
            .unwrap();
        let report = oversee(&policy, TaskId::new(1), &argv(&["sh", "-c", &script])).await;

        assert_eq!(report.attempts(), 3);
        assert_eq!(lines(&log), 3);
        assert_eq!(report.outcome, ExitOutcome::Exited(1));
        assert_eq!(report.verdict, Verdict::FilterFailed);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn no_filter_never_reruns_on_exit_code() {
        let policy = Policy::builder().max_parallel(1).build().unwrap();
        let report = oversee(&policy, TaskId::new(1), &argv(&["false"])).await;

        assert_eq!(report.reruns, 0);
        assert_eq!(report.outcome, ExitOutcome::Exited(1));
        assert!(report.succeeded());
    }

    #[tokio::test]
    async fn must_not_equal_reruns_on_matching_code() {
        let policy = Policy::builder()
            .max_parallel(1)
            .must_not_equal(Some(3))
            .max_reruns(1)
            .build()
            .unwrap();

        let report = oversee(&policy, TaskId::new(1), &argv(&["sh", "-c", "exit 3"])).await;
        assert_eq!(report.attempts(), 2);
        assert_eq!(report.verdict, Verdict::FilterFailed);

        let report = oversee(&policy, TaskId::new(2), &argv(&["sh", "-c", "exit 4"])).await;
        assert_eq!(report.attempts(), 1);
        assert_eq!(report.outcome, ExitOutcome::Exited(4));
    }

    #[tokio::test]
    async fn timeout_terminates_and_counts_as_failure() {
        let policy = Policy::builder()
            .max_parallel(1)
            .timeout_secs(1.0)
            .max_reruns(1)
            .build()
            .unwrap();

        let started = Instant::now();
        let report = oversee(&policy, TaskId::new(1), &argv(&["sleep", "5"])).await;
        let elapsed = started.elapsed();

        assert_eq!(report.outcome, ExitOutcome::TimedOut);
        assert_eq!(report.verdict, Verdict::TimedOut);
        assert_eq!(report.attempts(), 2);
        assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "{elapsed:?}");
    }

    #[tokio::test]
    async fn unlimited_reruns_until_condition_clears() {
        let dir = scratch();
        let counter = dir.join("n");
        let script = format!(
            "n=$(cat {c} 2>/dev/null || echo 0); n=$((n+1)); echo $n > {c}; [ \"$n\" -ge 4 ]",
            c = counter.display()
        );

        let policy = Policy::builder()
            .max_parallel(1)
            .max_reruns(0)
            .must_equal(Some(0))
            .build()
            .unwrap();
        let report = oversee(&policy, TaskId::new(1), &argv(&["sh", "-c", &script])).await;

        assert_eq!(report.reruns, 3);
        assert_eq!(report.outcome, ExitOutcome::Exited(0));
        assert!(report.succeeded());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn spawn_failure_is_an_exit_status() {
        let policy = Policy::builder()
            .max_parallel(1)
            .must_equal(Some(0))
            .max_reruns(1)
            .build()
            .unwrap();
        let report = oversee(
            &policy,
            TaskId::new(1),
            &argv(&["/nonexistent/fanout-no-such-binary"]),
        )
        .await;

        assert!(matches!(report.outcome, ExitOutcome::SpawnFailed(_)));
        assert_eq!(report.outcome.status_code(), Some(SPAWN_FAILED_STATUS));
        assert_eq!(report.attempts(), 2);
    }

    #[tokio::test]
    async fn empty_invocation_does_not_panic() {
        let policy = Policy::builder().max_parallel(1).build().unwrap();
        let report = oversee(&policy, TaskId::new(1), &Invocation::default()).await;

        assert!(matches!(report.outcome, ExitOutcome::SpawnFailed(_)));
        assert_eq!(report.reruns, 0);
    }

    #[tokio::test]
    async fn shell_mode_runs_joined_line() {
        let policy = Policy::builder().max_parallel(1).use_shell(true).build().unwrap();
        let report = oversee(&policy, TaskId::new(1), &argv(&["exit", "4"])).await;

        assert_eq!(report.outcome, ExitOutcome::Exited(4));
    }

    #[tokio::test]
    async fn signal_death_is_reported() {
        let policy = Policy::builder().max_parallel(1).build().unwrap();
        let report = oversee(&policy, TaskId::new(1), &argv(&["sh", "-c", "kill -9 $$"])).await;

        assert_eq!(report.outcome, ExitOutcome::Signaled(9));
        assert_eq!(report.outcome.status_code(), Some(137));
    }

    #[tokio::test]
    async fn delay_paces_reruns() {
        let policy = Policy::builder()
            .max_parallel(1)
            .must_equal(Some(0))
            .max_reruns(2)
            .delay_secs(0.3)
            .build()
            .unwrap();

        let started = Instant::now();
        let report = oversee(&policy, TaskId::new(1), &argv(&["false"])).await;
        let elapsed = started.elapsed();

        assert_eq!(report.attempts(), 3);
        assert!(elapsed >= Duration::from_millis(600), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "{elapsed:?}");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf)
                .lines()
                .map(|l| l.trim().to_string())
                .collect()
        }
    }

    /// Routes `fanout.verbose` lines, bare, into the returned buffer for the current thread.
    fn capture_verbose() -> (Captured, tracing::subscriber::DefaultGuard) {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("fanout.verbose=info"))
            .with_writer(move || writer.clone())
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_ansi(false)
            .finish();
        (out, tracing::subscriber::set_default(subscriber))
    }

    #[tokio::test]
    async fn verbose_lines_mark_each_spawn_and_status() {
        let (out, _guard) = capture_verbose();
        let policy = Policy::builder()
            .max_parallel(1)
            .must_equal(Some(0))
            .max_reruns(1)
            .verbose(true)
            .build()
            .unwrap();

        oversee(&policy, TaskId::new(1), &argv(&["sh", "-c", "exit 1"])).await;

        assert_eq!(
            out.lines(),
            [
                "sh -c exit 1 # 0",
                "sh -c exit 1 : 1",
                "sh -c exit 1 # 1",
                "sh -c exit 1 : 1",
            ]
        );
    }

    #[tokio::test]
    async fn verbose_lines_report_timeout() {
        let (out, _guard) = capture_verbose();
        let policy = Policy::builder()
            .max_parallel(1)
            .timeout_secs(0.2)
            .max_reruns(1)
            .verbose(true)
            .build()
            .unwrap();

        oversee(&policy, TaskId::new(1), &argv(&["sleep", "5"])).await;

        assert_eq!(
            out.lines(),
            ["sleep 5 # 0", "sleep 5 : timeout", "sleep 5 # 1", "sleep 5 : timeout"]
        );
    }

    #[tokio::test]
    async fn quiet_policy_logs_no_verbose_lines() {
        let (out, _guard) = capture_verbose();
        let policy = Policy::builder().max_parallel(1).build().unwrap();

        oversee(&policy, TaskId::new(1), &argv(&["true"])).await;

        assert!(out.lines().is_empty());
    }
}
