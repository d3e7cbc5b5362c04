//! Connection façade
//!
//! A `Connection` is what every command talks to. It is bound to exactly one
//! backend for its whole lifetime and owns no OS resources beyond the
//! subprocesses spawned by individual operations. The resolved pod name and
//! namespace are cached for the invocation; a connection is meant to be owned
//! by one command, not shared between tasks.

use tracing::debug;

use crate::backend::Backend;
use crate::command::Command;
use crate::driver::RuntimeDriver;
use crate::drivers::{KubernetesDriver, PodmanDriver};
use crate::error::{Error, Result};
use crate::event::LogFilter;
use crate::runner;

/// Path prefix designating the in-container side of a copy
pub const REMOTE_PREFIX: &str = "server:";

/// A connection to the managed server container or pod
pub struct Connection {
    backend: Backend,
    driver: Box<dyn RuntimeDriver>,
    pod_name: Option<String>,
    namespace: Option<String>,
}

impl Connection {
    /// Create a new connection. Pure construction, the backend is not
    /// contacted until an operation needs it.
    ///
    /// `container` is the podman container name, doubling as the in-pod
    /// container name on Kubernetes. `filter` is the label selector used to
    /// find the pod and is ignored by the podman driver.
    pub fn new(backend: Backend, container: &str, filter: &str) -> Self {
        let driver: Box<dyn RuntimeDriver> = match backend {
            Backend::Podman => Box::new(PodmanDriver::new(container)),
            Backend::Kubernetes => Box::new(KubernetesDriver::new(filter, container)),
        };
        Self {
            backend,
            driver,
            pod_name: None,
            namespace: None,
        }
    }

    /// Create a connection around a specific driver, bypassing the backend
    /// dispatch. Lets tests script the driver side.
    #[cfg(test)]
    pub(crate) fn with_driver(backend: Backend, driver: Box<dyn RuntimeDriver>) -> Self {
        Self {
            backend,
            driver,
            pod_name: None,
            namespace: None,
        }
    }

    /// The backend this connection is bound to
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The backend CLI executable
    pub fn command(&self) -> &'static str {
        self.driver.executable()
    }

    /// The filter suppressing backend noise on streamed exec output
    pub fn noise_filter(&self) -> Box<dyn LogFilter> {
        self.driver.noise_filter()
    }

    /// Resolve the namespace, caching the result for this invocation.
    ///
    /// A non-empty `requested` value wins over kubeconfig lookup. Always
    /// empty on podman.
    pub async fn namespace(&mut self, requested: &str) -> Result<String> {
        if let Some(namespace) = &self.namespace {
            return Ok(namespace.clone());
        }
        let namespace = self.driver.resolve_namespace(requested).await?;
        self.namespace = Some(namespace.clone());
        Ok(namespace)
    }

    /// Resolve the pod or container identifier, caching the result.
    ///
    /// Never returns an empty identifier: resolution either produces a
    /// non-empty name or a typed error.
    pub async fn pod_name(&mut self) -> Result<String> {
        if let Some(pod_name) = &self.pod_name {
            return Ok(pod_name.clone());
        }
        let namespace = self.namespace("").await?;
        let pod_name = self.driver.resolve_target(&namespace).await?;
        debug!("Resolved target '{pod_name}'");
        self.pod_name = Some(pod_name.clone());
        Ok(pod_name)
    }

    /// Backend-specific prefix arguments for an exec invocation, with the
    /// target and namespace already resolved.
    pub async fn exec_args(&mut self, interactive: bool, tty: bool) -> Result<Vec<String>> {
        let pod_name = self.pod_name().await?;
        let namespace = self.namespace("").await?;
        Ok(self
            .driver
            .exec_args(&pod_name, &namespace, interactive, tty))
    }

    /// Run a command inside the target, non-interactive, output captured.
    ///
    /// Used for short administrative reads. Returns the stdout bytes; a
    /// non-zero exit surfaces as `CommandFailed` carrying the exit code and
    /// the combined output.
    pub async fn exec<S: AsRef<str>>(&mut self, program: &str, args: &[S]) -> Result<Vec<u8>> {
        let prefix = self.exec_args(false, false).await?;
        let cmd = Command::builder(self.command())
            .args(prefix)
            .arg(program)
            .args(args.iter().map(|a| a.as_ref()))
            .build();
        runner::run_captured(&cmd).await
    }

    /// Returns whether `path` exists inside the target
    pub async fn path_exists(&mut self, path: &str) -> Result<bool> {
        match self.exec("test", &["-e", path]).await {
            Ok(_) => Ok(true),
            Err(Error::CommandFailed { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Transfer a file to or from the target.
    ///
    /// Prefix exactly one of `src` or `dst` with `server:` to designate the
    /// in-container path. `user` and `group` set the owner of a file
    /// transferred into the container.
    pub async fn copy(&mut self, src: &str, dst: &str, user: &str, group: &str) -> Result<()> {
        let src_remote = src.starts_with(REMOTE_PREFIX);
        let dst_remote = dst.starts_with(REMOTE_PREFIX);
        // Validated before anything is launched.
        if src_remote == dst_remote {
            return Err(Error::InvalidCopySpec {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }

        let pod_name = self.pod_name().await?;
        let namespace = self.namespace("").await?;

        let expand = |path: &str, remote: bool| {
            if remote {
                self.driver.remote_path(
                    &pod_name,
                    &namespace,
                    path.strip_prefix(REMOTE_PREFIX).unwrap_or(path),
                )
            } else {
                path.to_string()
            }
        };
        let src_expanded = expand(src, src_remote);
        let dst_expanded = expand(dst, dst_remote);

        let cmd = Command::builder(self.command())
            .args(self.driver.copy_args(&src_expanded, &dst_expanded, &namespace))
            .build();
        let status = runner::run_streamed(&cmd, self.driver.noise_filter().as_ref()).await?;
        if !status.success() {
            return Err(Error::CommandFailed {
                exit_code: status.propagation_code(),
                output: String::new(),
            });
        }

        if dst_remote && !user.is_empty() {
            let owner = if group.is_empty() {
                user.to_string()
            } else {
                format!("{user}:{group}")
            };
            let in_container = dst.strip_prefix(REMOTE_PREFIX).unwrap_or(dst);
            self.exec("chown", &[owner.as_str(), in_container]).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_is_pure() {
        let cnx = Connection::new(Backend::Podman, "server", "app=server");
        assert_eq!(cnx.backend(), Backend::Podman);
        assert_eq!(cnx.command(), "podman");
    }

    #[test]
    fn test_kubernetes_command() {
        let cnx = Connection::new(Backend::Kubernetes, "server", "app=server");
        assert_eq!(cnx.command(), "kubectl");
    }

    #[test]
    fn test_pod_name_is_never_empty_and_ok() {
        smol::block_on(async {
            // Whether or not podman is installed on the test host, resolving
            // a container that does not exist must produce a typed error.
            let mut cnx = Connection::new(Backend::Podman, "no-such-container-a6f2", "");
            match cnx.pod_name().await {
                Ok(name) => assert!(!name.is_empty()),
                Err(err) => assert!(matches!(
                    err,
                    Error::TargetNotFound { .. } | Error::LaunchFailed { .. }
                )),
            }
        });
    }

    #[test]
    fn test_copy_rejects_both_remote() {
        smol::block_on(async {
            let mut cnx = Connection::new(Backend::Podman, "server", "");
            let err = cnx
                .copy("server:/a", "server:/b", "", "")
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidCopySpec { .. }));
        });
    }

    #[test]
    fn test_copy_rejects_neither_remote() {
        smol::block_on(async {
            let mut cnx = Connection::new(Backend::Podman, "server", "");
            let err = cnx.copy("/a", "/b", "root", "root").await.unwrap_err();
            assert!(matches!(err, Error::InvalidCopySpec { .. }));
        });
    }
}
