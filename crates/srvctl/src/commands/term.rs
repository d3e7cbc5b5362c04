//! Interactive terminal session inside the server container

use anyhow::{Context, Result};
use backend_connection::{Command, forward_env, runner};

/// Open a login shell in the target, bridging the operator's terminal.
pub async fn run(backend: &str) -> Result<i32> {
    let mut cnx = super::connect(backend)?;
    let prefix = cnx
        .exec_args(true, true)
        .await
        .context("Failed to resolve the server container")?;

    let env_entries = forward_env(&["TERM".to_string(), "ENV=/etc/sh.shrc.local".to_string()]);

    let mut cmd = Command::new(cnx.command());
    cmd.args(prefix);
    cmd.arg("env");
    cmd.args(env_entries);
    cmd.arg("bash");

    let status = runner::run_streamed(&cmd, cnx.noise_filter().as_ref()).await?;
    Ok(status.propagation_code())
}
