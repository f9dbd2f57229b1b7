use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type Output = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Builds the output layer for `cfg.format` and installs it behind `cfg.level`.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = mk_filter(&cfg.level)?;
    let output = match cfg.format {
        LoggerFormat::Text => text(cfg),
        LoggerFormat::Json => json(cfg),
        LoggerFormat::Journald => journald()?,
    };

    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .try_init()
        .map_err(as_error)
}

fn text(cfg: &LoggerConfig) -> Output {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg.use_color)
        .with_target(cfg.with_targets)
        .with_timer(mk_timer())
        .boxed()
}

fn json(cfg: &LoggerConfig) -> Output {
    fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_timer(mk_timer())
        .boxed()
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald() -> Result<Output, LoggerError> {
    tracing_journald::layer()
        .map(|layer| layer.boxed())
        .map_err(|e| LoggerError::Install(format!("journald: {e}")))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald() -> Result<Output, LoggerError> {
    Err(LoggerError::JournaldUnavailable)
}

fn mk_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|e| LoggerError::InvalidFilter {
        directive: level.to_string(),
        reason: e.to_string(),
    })
}

/// RFC 3339 in local time; falls back to UTC when the offset cannot be determined.
fn mk_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn as_error(e: impl std::fmt::Display) -> LoggerError {
    let s = e.to_string();
    if s.contains("SetGlobalDefaultError") || s.contains("global default") {
        LoggerError::AlreadyInitialized
    } else {
        LoggerError::Install(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_is_rejected_before_init() {
        let err = mk_filter("fanout=notalevel").unwrap_err();
        assert!(
            matches!(err, LoggerError::InvalidFilter { directive, .. } if directive == "fanout=notalevel")
        );
    }

    #[test]
    fn timer_stamps_rfc3339() {
        use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

        let mut out = String::new();
        mk_timer().format_time(&mut Writer::new(&mut out)).unwrap();
        assert_eq!(out.as_bytes().get(10), Some(&b'T'), "{out}");
        assert!(out.ends_with('Z') || out[19..].contains(['+', '-']), "{out}");
    }

    #[test]
    fn directives_are_accepted() {
        assert!(mk_filter("warn,fanout.verbose=info").is_ok());
    }

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_output_needs_the_feature() {
        assert!(matches!(journald(), Err(LoggerError::JournaldUnavailable)));
    }
}
