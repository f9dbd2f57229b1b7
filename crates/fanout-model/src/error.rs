use thiserror::Error;

/// Rejected startup configuration. Always fatal: no input is read after one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("command template (-c) is required")]
    MissingTemplate,
    #[error("command template is empty")]
    EmptyTemplate,
    #[error("max parallel (-n) is required")]
    MissingMaxParallel,
    #[error("max parallel must be at least 1, got {0}")]
    InvalidMaxParallel(usize),
    #[error("-E and -e are mutually exclusive")]
    ConflictingExitFilters,
    #[error("invalid {name}: {value} (expected a non-negative number of seconds)")]
    InvalidSeconds { name: &'static str, value: f64 },
}
