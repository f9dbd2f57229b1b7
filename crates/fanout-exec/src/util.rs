use std::{process::Stdio, time::Duration};

use tokio::process::{Child, Command};
use tracing::debug;

use fanout_model::Invocation;

use crate::error::{ExecError, ExecResult};

/// How long a terminated child gets to exit before it is killed outright.
pub const KILL_GRACE: Duration = Duration::from_secs(5);

pub fn cmd_program(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|s| s.as_str()));
    cmd
}

cfg_if::cfg_if! {
    if #[cfg(target_family = "windows")] {
        const SHELL: (&str, &str) = ("cmd", "/C");
    } else {
        const SHELL: (&str, &str) = ("sh", "-c");
    }
}

/// Runs `line` through the system command interpreter.
pub fn cmd_shell(line: &str) -> Command {
    let (shell, flag) = SHELL;
    let mut cmd = Command::new(shell);
    cmd.arg(flag).arg(line);
    cmd
}

/// Builds the command for one attempt.
///
/// Children never share the tool's stdin, which may be the record stream.
pub fn build_command(invocation: &Invocation, use_shell: bool) -> ExecResult<Command> {
    let program = invocation.program().ok_or(ExecError::MissingProgram)?;
    let mut cmd = if use_shell {
        cmd_shell(&invocation.words())
    } else {
        cmd_program(program, invocation.args())
    };
    cmd.stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    Ok(cmd)
}

/// Sends SIGTERM, then reaps the child, escalating to SIGKILL after [`KILL_GRACE`].
#[cfg(target_family = "unix")]
pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    if let Some(id) = child.id() {
        // SAFETY: plain syscall on a pid we own and have not reaped yet.
        let _ = unsafe { libc::kill(id as libc::pid_t, libc::SIGTERM) };
    }
    match tokio::time::timeout(KILL_GRACE, child.wait()).await {
        Ok(status) => status.map(|_| ()),
        Err(_) => {
            debug!(target: "fanout.exec.util", "child ignored SIGTERM; killing");
            child.kill().await
        }
    }
}

#[cfg(target_family = "windows")]
pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    child.kill().await
}
