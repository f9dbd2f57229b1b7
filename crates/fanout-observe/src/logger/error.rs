use thiserror::Error;

/// Failures while installing the diagnostic stream.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format `{0}` (expected text, json or journald)")]
    InvalidFormat(String),
    #[error("journald output needs Linux and the `journald` feature")]
    JournaldUnavailable,
    #[error("a global logger is already installed")]
    AlreadyInitialized,
    #[error("cannot install logger: {0}")]
    Install(String),
    #[error("bad log filter `{directive}`: {reason}")]
    InvalidFilter { directive: String, reason: String },
}
