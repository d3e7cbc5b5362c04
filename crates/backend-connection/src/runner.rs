//! Subprocess execution
//!
//! The runner owns a backend CLI invocation end to end: spawn, stream copy,
//! wait, exit-code translation. Interactive sessions get the operator's own
//! stdin so no buffering layer sits between the keyboard and the remote
//! process; stdout and stderr are piped and each chunk is forwarded the
//! moment it is read, so a shell prompt without a trailing newline reaches
//! the operator while the remote process is still running. Both streams are
//! drained concurrently with the wait, because draining them serially can
//! deadlock the child once one pipe buffer fills up.
//!
//! The runner installs no signal handler. Ctrl-C reaches the child through
//! normal process-group inheritance and surfaces as a non-zero exit.

use async_process::Stdio;
use futures_lite::io::{AsyncRead, AsyncReadExt};
use std::io::Write;
use tracing::debug;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::event::{LogFilter, LogSource};

/// Process exit status
#[derive(Debug, Clone)]
pub struct ExitStatus {
    /// Exit code if the process exited normally
    pub code: Option<i32>,
    /// Signal that terminated the process (Unix only)
    #[cfg(unix)]
    pub signal: Option<i32>,
}

impl ExitStatus {
    /// Returns true if the process exited successfully (code 0)
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The code this CLI process should itself exit with.
    ///
    /// Signal terminations map to the shell convention of 128 + signal.
    pub fn propagation_code(&self) -> i32 {
        if let Some(code) = self.code {
            return code;
        }
        #[cfg(unix)]
        if let Some(signal) = self.signal {
            return 128 + signal;
        }
        1
    }

    fn from_os(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
            #[cfg(unix)]
            signal: {
                use std::os::unix::process::ExitStatusExt;
                status.signal()
            },
        }
    }
}

/// Run a command with the operator's stdin wired through and output streamed.
///
/// Every output chunk goes through `filter`; suppressed chunks are still
/// logged at debug level. Returns the child's exact exit status, which the
/// caller is expected to propagate.
pub async fn run_streamed(command: &Command, filter: &dyn LogFilter) -> Result<ExitStatus> {
    debug!(
        "Running: {} {}",
        command.get_program().to_string_lossy(),
        command
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut cmd = command.prepare();
    cmd.stdin(Stdio::inherit());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        Error::launch_failed(command.get_program().to_string_lossy(), e.to_string())
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Both copies must be live while waiting, so all three are joined.
    let (_, _, status) = futures::join!(
        copy_output(stdout, LogSource::Stdout, filter),
        copy_output(stderr, LogSource::Stderr, filter),
        child.status(),
    );

    Ok(ExitStatus::from_os(status?))
}

/// Run a command with output captured instead of streamed.
///
/// Returns the stdout bytes on success. On a non-zero exit the combined
/// stdout and stderr are carried in the error so callers can inspect or
/// report what the backend tool printed.
pub async fn run_captured(command: &Command) -> Result<Vec<u8>> {
    debug!(
        "Running (captured): {} {}",
        command.get_program().to_string_lossy(),
        command
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut cmd = command.prepare();
    cmd.stdin(Stdio::null());
    let output = cmd.output().await.map_err(|e| {
        Error::launch_failed(command.get_program().to_string_lossy(), e.to_string())
    })?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(Error::CommandFailed {
            exit_code: ExitStatus::from_os(output.status).propagation_code(),
            output: combined.trim_end().to_string(),
        })
    }
}

async fn copy_output<R>(reader: Option<R>, source: LogSource, filter: &dyn LogFilter)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else { return };
    match source {
        LogSource::Stdout => forward(reader, source, filter, &mut std::io::stdout()).await,
        LogSource::Stderr => forward(reader, source, filter, &mut std::io::stderr()).await,
    }
}

/// Copy each chunk to `writer` as soon as it is read, without waiting for a
/// newline. Chunks are forwarded in OS delivery order per stream; no global
/// ordering between the two streams.
async fn forward<R, W>(mut reader: R, source: LogSource, filter: &dyn LogFilter, writer: &mut W)
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut buf = [0u8; 4096];
    loop {
        let read = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        let chunk = &buf[..read];
        // Backend trailers arrive as whole chunks of their own, so the
        // suppression check applies per chunk.
        let text = String::from_utf8_lossy(chunk);
        if filter.filter(&text, source).is_some() {
            let _ = writer.write_all(chunk);
            let _ = writer.flush();
        } else {
            debug!("suppressed {source:?} output: {}", text.trim_end());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KubectlNoiseFilter, NoOpFilter};
    use std::time::{Duration, Instant};

    struct RecordingSink {
        first_write: Option<Instant>,
        data: Vec<u8>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                first_write: None,
                data: Vec::new(),
            }
        }
    }

    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.first_write.is_none() {
                self.first_write = Some(Instant::now());
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_partial_line_reaches_the_operator_while_child_runs() {
        smol::block_on(async {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", "printf 'prompt> '; sleep 1"]);
            let mut prepared = cmd.prepare();
            prepared
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null());
            let mut child = prepared.spawn().unwrap();
            let stdout = child.stdout.take().unwrap();

            let start = Instant::now();
            let mut sink = RecordingSink::new();
            let (_, status) = futures::join!(
                forward(stdout, LogSource::Stdout, &NoOpFilter, &mut sink),
                child.status(),
            );

            assert!(status.unwrap().success());
            assert_eq!(sink.data, b"prompt> ");
            let first = sink.first_write.expect("no output was forwarded");
            assert!(
                first.duration_since(start) < Duration::from_millis(800),
                "prompt arrived only after the child exited"
            );
        });
    }

    #[test]
    fn test_noise_chunks_are_suppressed() {
        smol::block_on(async {
            let reader =
                futures_lite::io::Cursor::new(b"command terminated with exit code 1\n".to_vec());
            let mut sink = RecordingSink::new();
            forward(reader, LogSource::Stderr, &KubectlNoiseFilter, &mut sink).await;

            assert!(sink.data.is_empty());
        });
    }

    #[test]
    fn test_regular_chunks_pass_through_unchanged() {
        smol::block_on(async {
            let reader = futures_lite::io::Cursor::new(b"hello\nworld".to_vec());
            let mut sink = RecordingSink::new();
            forward(reader, LogSource::Stdout, &KubectlNoiseFilter, &mut sink).await;

            assert_eq!(sink.data, b"hello\nworld");
        });
    }
}
