use std::fmt;

use crate::{ExitFilter, TaskId};

/// Status fed to the exit filter when the child image could not be started.
pub const SPAWN_FAILED_STATUS: i32 = 127;

/// How one attempt of an invocation ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Child exited normally with this code.
    Exited(i32),
    /// Child was terminated by a signal it did not expect.
    Signaled(i32),
    /// Child image could not be started.
    SpawnFailed(String),
    /// Child outlived the configured timeout and was terminated.
    TimedOut,
}

impl ExitOutcome {
    /// Numeric status the exit filter sees.
    ///
    /// Signal deaths map to `128 + signal`, spawn failures to [`SPAWN_FAILED_STATUS`].
    /// `None` for timeouts, which fail regardless of the filter.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            ExitOutcome::Exited(code) => Some(*code),
            ExitOutcome::Signaled(sig) => Some(128 + sig),
            ExitOutcome::SpawnFailed(_) => Some(SPAWN_FAILED_STATUS),
            ExitOutcome::TimedOut => None,
        }
    }

    /// Evaluates this outcome against `filter`.
    pub fn verdict(&self, filter: ExitFilter) -> Verdict {
        match self.status_code() {
            None => Verdict::TimedOut,
            Some(status) if filter.fails(status) => Verdict::FilterFailed,
            Some(_) => Verdict::Succeeded,
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "{code}"),
            ExitOutcome::Signaled(sig) => write!(f, "{} (signal {sig})", 128 + sig),
            ExitOutcome::SpawnFailed(reason) => {
                write!(f, "{SPAWN_FAILED_STATUS} (spawn failed: {reason})")
            }
            ExitOutcome::TimedOut => f.write_str("timeout"),
        }
    }
}

/// Result of evaluating one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Succeeded,
    TimedOut,
    FilterFailed,
}

impl Verdict {
    #[inline]
    pub fn is_failure(&self) -> bool {
        !matches!(self, Verdict::Succeeded)
    }
}

/// Final report of an oversight task, sent once after its last attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskReport {
    pub id: TaskId,
    /// Reruns performed; total spawn attempts are `reruns + 1`.
    pub reruns: u32,
    /// Outcome of the last attempt.
    pub outcome: ExitOutcome,
    /// Verdict of the last attempt.
    pub verdict: Verdict,
}

impl TaskReport {
    #[inline]
    pub fn attempts(&self) -> u64 {
        u64::from(self.reruns) + 1
    }

    #[inline]
    pub fn succeeded(&self) -> bool {
        !self.verdict.is_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ExitOutcome::Exited(3).status_code(), Some(3));
        assert_eq!(ExitOutcome::Signaled(9).status_code(), Some(137));
        assert_eq!(
            ExitOutcome::SpawnFailed("nope".into()).status_code(),
            Some(SPAWN_FAILED_STATUS)
        );
        assert_eq!(ExitOutcome::TimedOut.status_code(), None);
    }

    #[test]
    fn timeout_fails_under_any_filter() {
        assert_eq!(ExitOutcome::TimedOut.verdict(ExitFilter::None), Verdict::TimedOut);
        assert!(ExitOutcome::TimedOut.verdict(ExitFilter::None).is_failure());
    }

    #[test]
    fn spawn_failure_is_judged_like_an_exit_code() {
        let out = ExitOutcome::SpawnFailed("missing".into());
        assert_eq!(out.verdict(ExitFilter::None), Verdict::Succeeded);
        assert_eq!(out.verdict(ExitFilter::MustEqual(0)), Verdict::FilterFailed);
    }

    #[test]
    fn display_matches_diagnostic_format() {
        assert_eq!(ExitOutcome::Exited(1).to_string(), "1");
        assert_eq!(ExitOutcome::TimedOut.to_string(), "timeout");
        assert_eq!(ExitOutcome::Signaled(15).to_string(), "143 (signal 15)");
    }

    #[test]
    fn report_attempts() {
        let report = TaskReport {
            id: TaskId::new(1),
            reruns: 2,
            outcome: ExitOutcome::Exited(1),
            verdict: Verdict::FilterFailed,
        };
        assert_eq!(report.attempts(), 3);
        assert!(!report.succeeded());
    }
}
