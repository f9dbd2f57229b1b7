//! fanout - parallel command executor.
//!
//! Usage:
//!   fanout -c '<template>' -n <N> [-d SECS] [-E CODE | -e CODE] [-t SECS] [-r N] [-v] [-s] [FILE...]
//!
//! Each input line is split on whitespace; `$1`, `$2`, ... in the template take the
//! matching field. At most N invocations run at once; failures (per -E/-e or -t) are
//! rerun up to -r times. The exit status is 0 whenever all input has been processed.

mod cli;

use std::{process::ExitCode, sync::Arc};

use clap::{CommandFactory, Parser};
use tracing::{debug, error};

use cli::{Cli, RunConfig};
use fanout_core::{LineSource, Supervisor};
use fanout_exec::ProcRunner;
use fanout_model::ConfigError;
use fanout_observe::{Journal, logger_init};

/// Status for rejected flags, matching clap's own usage errors.
const USAGE_EXIT: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => return Ok(usage_error(&e)),
    };

    logger_init(&config.logger)?;
    debug!(template = %config.template, policy = ?config.policy, "configuration loaded");

    if let Err(e) = run(config).await {
        error!(error = %e, "run aborted");
        return Err(e);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run(config: RunConfig) -> anyhow::Result<()> {
    let RunConfig {
        template,
        policy,
        files,
        ..
    } = config;

    let policy = Arc::new(policy);
    let runner = Arc::new(ProcRunner::new(Arc::clone(&policy)));
    let supervisor =
        Supervisor::new(policy, template, runner).with_subscribers(vec![Arc::new(Journal::new())]);

    let mut source = LineSource::from_paths(files);
    supervisor.run(&mut source).await?;
    Ok(())
}

fn usage_error(e: &ConfigError) -> ExitCode {
    let mut cmd = Cli::command();
    eprintln!("error: {e}\n\n{}\n\nFor more information, try '--help'.", cmd.render_usage());
    ExitCode::from(USAGE_EXIT)
}
