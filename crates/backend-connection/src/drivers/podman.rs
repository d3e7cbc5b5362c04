//! Podman runtime driver

use async_trait::async_trait;
use tracing::trace;

use crate::backend::Backend;
use crate::command::Command;
use crate::driver::RuntimeDriver;
use crate::error::{Error, Result};
use crate::event::{LogFilter, NoOpFilter};
use crate::runner;

/// Driver reaching a container managed by podman on the local host
#[derive(Debug, Clone)]
pub struct PodmanDriver {
    /// The name of the container hosting the managed server
    container: String,
}

impl PodmanDriver {
    /// Create a driver for the given container name
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
        }
    }
}

#[async_trait]
impl RuntimeDriver for PodmanDriver {
    fn backend(&self) -> Backend {
        Backend::Podman
    }

    async fn resolve_target(&self, _namespace: &str) -> Result<String> {
        // The container name already is the identifier, but it must exist
        // and be running.
        let cmd = Command::builder("podman")
            .args(["ps", "-q", "-f"])
            .arg(format!("name={}", self.container))
            .build();
        let out = runner::run_captured(&cmd).await?;

        if out.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(Error::target_not_found(format!(
                "container {} is not running on podman",
                self.container
            )));
        }
        trace!(
            "Found container ID '{}'",
            String::from_utf8_lossy(&out).trim()
        );
        Ok(self.container.clone())
    }

    async fn resolve_namespace(&self, _requested: &str) -> Result<String> {
        Ok(String::new())
    }

    fn exec_args(
        &self,
        target: &str,
        _namespace: &str,
        interactive: bool,
        tty: bool,
    ) -> Vec<String> {
        let mut args = vec!["exec".to_string()];
        if interactive {
            args.push("-i".to_string());
        }
        if tty {
            args.push("-t".to_string());
        }
        args.push(target.to_string());
        args
    }

    fn copy_args(&self, src: &str, dst: &str, _namespace: &str) -> Vec<String> {
        vec!["cp".to_string(), src.to_string(), dst.to_string()]
    }

    fn remote_path(&self, target: &str, _namespace: &str, path: &str) -> String {
        format!("{target}:{path}")
    }

    fn noise_filter(&self) -> Box<dyn LogFilter> {
        Box::new(NoOpFilter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_args_plain() {
        let driver = PodmanDriver::new("server");
        assert_eq!(driver.exec_args("server", "", false, false), ["exec", "server"]);
    }

    #[test]
    fn test_exec_args_interactive_tty() {
        let driver = PodmanDriver::new("server");
        assert_eq!(
            driver.exec_args("server", "", true, true),
            ["exec", "-i", "-t", "server"]
        );
    }

    #[test]
    fn test_exec_args_deterministic() {
        let driver = PodmanDriver::new("server");
        assert_eq!(
            driver.exec_args("server", "", true, false),
            driver.exec_args("server", "", true, false)
        );
    }

    #[test]
    fn test_remote_path() {
        let driver = PodmanDriver::new("server");
        assert_eq!(driver.remote_path("server", "", "/etc/motd"), "server:/etc/motd");
    }
}
