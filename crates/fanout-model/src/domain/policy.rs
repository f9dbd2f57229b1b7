//! # Run policy.
//!
//! [`Policy`] is built once at startup through [`PolicyBuilder`] and never changes afterwards.
//! Every flag combination rule lives in [`PolicyBuilder::build`]:
//!
//! ```text
//! max_parallel   required, >= 1
//! delay          >= 0 seconds            (0 = no pause between launches)
//! timeout        >= 0 seconds            (0 = disabled)
//! must_equal     -E <code>  ┐
//! must_not_equal -e <code>  ┘ mutually exclusive
//! max_reruns     default 3               (0 = unlimited)
//! ```
use std::time::Duration;

use crate::ConfigError;

/// Reruns allowed per invocation when `-r` is not given.
pub const DEFAULT_MAX_RERUNS: u32 = 3;

/// Rule deciding whether an exit status counts as a failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExitFilter {
    /// Exit status is never a failure.
    #[default]
    None,
    /// Fails unless the status equals the code (`-E`).
    MustEqual(i32),
    /// Fails when the status equals the code (`-e`).
    MustNotEqual(i32),
}

impl ExitFilter {
    #[inline]
    pub fn fails(&self, status: i32) -> bool {
        match *self {
            ExitFilter::None => false,
            ExitFilter::MustEqual(code) => status != code,
            ExitFilter::MustNotEqual(code) => status == code,
        }
    }
}

/// Immutable run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Policy {
    max_parallel: usize,
    delay: Duration,
    exit_filter: ExitFilter,
    timeout: Option<Duration>,
    max_reruns: u32,
    verbose: bool,
    use_shell: bool,
}

impl Policy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    #[inline]
    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Pause applied before every spawn. `Duration::ZERO` when disabled.
    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[inline]
    pub fn exit_filter(&self) -> ExitFilter {
        self.exit_filter
    }

    /// `None` when timeouts are disabled.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `0` means unlimited.
    #[inline]
    pub fn max_reruns(&self) -> u32 {
        self.max_reruns
    }

    #[inline]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    #[inline]
    pub fn use_shell(&self) -> bool {
        self.use_shell
    }

    /// Whether a failed attempt that has already been rerun `rerun_count` times gets another go.
    #[inline]
    pub fn should_rerun(&self, rerun_count: u32) -> bool {
        self.max_reruns == 0 || rerun_count < self.max_reruns
    }
}

/// Collects raw flag values; [`PolicyBuilder::build`] is the only place they are validated.
#[derive(Clone, Debug)]
pub struct PolicyBuilder {
    max_parallel: Option<usize>,
    delay_secs: f64,
    must_equal: Option<i32>,
    must_not_equal: Option<i32>,
    timeout_secs: f64,
    max_reruns: u32,
    verbose: bool,
    use_shell: bool,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self {
            max_parallel: None,
            delay_secs: 0.0,
            must_equal: None,
            must_not_equal: None,
            timeout_secs: 0.0,
            max_reruns: DEFAULT_MAX_RERUNS,
            verbose: false,
            use_shell: false,
        }
    }
}

impl PolicyBuilder {
    pub fn max_parallel(mut self, n: usize) -> Self {
        self.max_parallel = Some(n);
        self
    }

    pub fn delay_secs(mut self, secs: f64) -> Self {
        self.delay_secs = secs;
        self
    }

    pub fn must_equal(mut self, code: Option<i32>) -> Self {
        self.must_equal = code;
        self
    }

    pub fn must_not_equal(mut self, code: Option<i32>) -> Self {
        self.must_not_equal = code;
        self
    }

    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn max_reruns(mut self, n: u32) -> Self {
        self.max_reruns = n;
        self
    }

    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = on;
        self
    }

    pub fn use_shell(mut self, on: bool) -> Self {
        self.use_shell = on;
        self
    }

    pub fn build(self) -> Result<Policy, ConfigError> {
        let max_parallel = match self.max_parallel {
            None => return Err(ConfigError::MissingMaxParallel),
            Some(0) => return Err(ConfigError::InvalidMaxParallel(0)),
            Some(n) => n,
        };

        let exit_filter = match (self.must_equal, self.must_not_equal) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingExitFilters),
            (Some(code), None) => ExitFilter::MustEqual(code),
            (None, Some(code)) => ExitFilter::MustNotEqual(code),
            (None, None) => ExitFilter::None,
        };

        let delay = seconds("delay", self.delay_secs)?;
        let timeout = seconds("timeout", self.timeout_secs)?;

        Ok(Policy {
            max_parallel,
            delay,
            exit_filter,
            timeout: (!timeout.is_zero()).then_some(timeout),
            max_reruns: self.max_reruns,
            verbose: self.verbose,
            use_shell: self.use_shell,
        })
    }
}

fn seconds(name: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidSeconds { name, value })
}
