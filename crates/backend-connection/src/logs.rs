//! Log multiplexing
//!
//! A single remote `tail` invocation covers every requested path so the
//! interleaving of multiple files is produced by the remote shell, not by
//! client-side fan-in.

use crate::command::Command;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::runner::{self, ExitStatus};

/// Tail the given log paths inside the target.
///
/// `paths` entries may be plain paths, globs or shell substitutions, expanded
/// by the remote shell. With `follow` the call streams until the remote tail
/// exits or the operator interrupts it; there is no artificial timeout.
pub async fn tail(cnx: &mut Connection, paths: &[String], follow: bool) -> Result<ExitStatus> {
    if paths.is_empty() {
        return Err(Error::NoLogSourceSelected);
    }

    let prefix = cnx.exec_args(true, true).await?;
    let shell = tail_command(paths, follow);
    let cmd = Command::builder(cnx.command())
        .args(prefix)
        .args(["sh", "-c", shell.as_str()])
        .build();

    runner::run_streamed(&cmd, cnx.noise_filter().as_ref()).await
}

/// The remote shell command line tailing `paths`
fn tail_command(paths: &[String], follow: bool) -> String {
    let mut command = String::from("tail");
    if follow {
        command.push_str(" -f");
    }
    for path in paths {
        command.push(' ');
        command.push_str(path);
    }
    command
}
