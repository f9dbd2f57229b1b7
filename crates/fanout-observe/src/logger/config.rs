use std::io::IsTerminal;

use crate::logger::format::LoggerFormat;

/// Filter applied when `-v` is not given: only problems are shown.
pub const QUIET_LEVEL: &str = "warn";
/// Filter applied with `-v`: per-spawn diagnostic lines become visible.
pub const VERBOSE_LEVEL: &str = "info";
/// Directive that keeps per-spawn lines visible whatever the base filter is.
pub const VERBOSE_DIRECTIVE: &str = "fanout.verbose=info";

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Any `EnvFilter` directive, e.g. `info` or `warn,fanout.core=debug`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    pub fn for_verbosity(verbose: bool) -> Self {
        let level = if verbose { VERBOSE_LEVEL } else { QUIET_LEVEL };
        Self {
            level: level.to_string(),
            ..Default::default()
        }
    }

    /// Replaces the filter with `directive`, keeping verbose lines on when asked for.
    pub fn with_filter(mut self, directive: &str, verbose: bool) -> Self {
        self.level = if verbose {
            format!("{directive},{VERBOSE_DIRECTIVE}")
        } else {
            directive.to_string()
        };
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stderr().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: QUIET_LEVEL.to_string(),
            with_targets: false,
            use_color,
        }
    }
}
