//! Run a command inside the server container

use anyhow::{Context, Result};
use backend_connection::{Command, forward_env, runner};
use tracing::info;

/// Execute `command` through `sh -c` inside the target, streaming output and
/// propagating the remote exit code.
pub async fn run(
    backend: &str,
    mut env: Vec<String>,
    interactive: bool,
    tty: bool,
    command: Vec<String>,
) -> Result<i32> {
    let mut cnx = super::connect(backend)?;
    let prefix = cnx
        .exec_args(interactive, tty)
        .await
        .context("Failed to resolve the server container")?;

    // Interactive shells want a usable rc file and terminal type.
    if interactive {
        env.push("ENV=/etc/sh.shrc.local".to_string());
    }
    if tty {
        env.push("TERM".to_string());
    }
    let env_entries = forward_env(&env);

    let mut cmd = Command::new(cnx.command());
    cmd.args(prefix);
    if !env_entries.is_empty() {
        cmd.arg("env");
        cmd.args(env_entries);
    }
    let shell = command.join(" ");
    cmd.args(["sh", "-c", shell.as_str()]);

    let status = runner::run_streamed(&cmd, cnx.noise_filter().as_ref()).await?;
    if status.success() {
        info!("Command returned with exit code 0");
    } else {
        info!("Command failed with exit code {}", status.propagation_code());
    }
    Ok(status.propagation_code())
}
