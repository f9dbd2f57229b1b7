use std::path::PathBuf;

use clap::Parser;

use fanout_model::{CommandTemplate, ConfigError, DEFAULT_MAX_RERUNS, Policy};
use fanout_observe::{LoggerConfig, LoggerFormat};

/// fanout - run a command template once per input line, N at a time
#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(author, version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Command template; `$1`, `$2`, ... are replaced by the fields of each line
    #[arg(short = 'c', value_name = "TEMPLATE")]
    pub command: Option<String>,

    /// Maximum number of invocations running at once
    #[arg(short = 'n', value_name = "N")]
    pub max_parallel: Option<usize>,

    /// Seconds to wait before each launch
    #[arg(short = 'd', value_name = "SECONDS", default_value_t = 0.0)]
    pub delay: f64,

    /// Rerun unless the exit status equals CODE
    #[arg(short = 'E', value_name = "CODE")]
    pub must_equal: Option<i32>,

    /// Rerun if the exit status equals CODE
    #[arg(short = 'e', value_name = "CODE")]
    pub must_not_equal: Option<i32>,

    /// Terminate and rerun invocations running longer than SECONDS (0 disables)
    #[arg(short = 't', value_name = "SECONDS", default_value_t = 0.0)]
    pub timeout: f64,

    /// Reruns allowed per invocation (0 = unlimited)
    #[arg(short = 'r', value_name = "N", default_value_t = DEFAULT_MAX_RERUNS)]
    pub reruns: u32,

    /// Log every spawn and exit status to stderr
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Run each invocation through the system shell
    #[arg(short = 's')]
    pub shell: bool,

    /// Log filter directive (replaces the -v level; -v lines stay on), e.g. `debug` or `warn,fanout.pool=debug`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Log output format: text, json or journald
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    /// Input files; standard input when none are given (`-` also means stdin)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Everything `main` needs, validated.
#[derive(Debug)]
pub struct RunConfig {
    pub template: CommandTemplate,
    pub policy: Policy,
    pub logger: LoggerConfig,
    pub files: Vec<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> Result<RunConfig, ConfigError> {
        let template = self
            .command
            .as_deref()
            .ok_or(ConfigError::MissingTemplate)
            .and_then(CommandTemplate::parse)?;

        let mut builder = Policy::builder()
            .delay_secs(self.delay)
            .must_equal(self.must_equal)
            .must_not_equal(self.must_not_equal)
            .timeout_secs(self.timeout)
            .max_reruns(self.reruns)
            .verbose(self.verbose)
            .use_shell(self.shell);
        if let Some(n) = self.max_parallel {
            builder = builder.max_parallel(n);
        }
        let policy = builder.build()?;

        let mut logger = LoggerConfig::for_verbosity(self.verbose);
        logger.format = self.log_format;
        if let Some(level) = self.log_level.as_deref() {
            logger = logger.with_filter(level, self.verbose);
        }

        Ok(RunConfig {
            template,
            policy,
            logger,
            files: self.files,
        })
    }
}
