//! Runtime driver trait
//!
//! The two container runtimes are structurally different: podman addresses
//! the target by container name on the local host, kubectl needs a namespace,
//! a label selector and a sidecar container flag. Everything backend-specific
//! lives behind this trait; higher layers never hand-assemble runtime flags.

use async_trait::async_trait;

use crate::backend::Backend;
use crate::error::Result;
use crate::event::LogFilter;

/// A driver implementing the capability set of one container runtime
#[async_trait]
pub trait RuntimeDriver: Send + Sync {
    /// The backend this driver reaches
    fn backend(&self) -> Backend;

    /// The CLI executable to invoke, `"podman"` or `"kubectl"`
    fn executable(&self) -> &'static str {
        self.backend().executable()
    }

    /// Resolve the concrete container or pod identifier.
    ///
    /// Fails with `TargetNotFound` when nothing matches and with
    /// `AmbiguousTarget` when a filter matches more than one pod; a match is
    /// never picked silently.
    async fn resolve_target(&self, namespace: &str) -> Result<String>;

    /// Resolve the namespace, empty for podman.
    ///
    /// A non-empty `requested` value wins; otherwise the current kubeconfig
    /// context decides. Failure to resolve is `NamespaceUnresolved`.
    async fn resolve_namespace(&self, requested: &str) -> Result<String>;

    /// Backend-specific prefix arguments for an exec invocation.
    ///
    /// Deterministic: the same inputs always produce the same argument list.
    /// The inner command is appended by the caller after this prefix.
    fn exec_args(&self, target: &str, namespace: &str, interactive: bool, tty: bool)
    -> Vec<String>;

    /// Arguments for the backend's native copy mechanism.
    ///
    /// `src` and `dst` are already expanded, remote side included.
    fn copy_args(&self, src: &str, dst: &str, namespace: &str) -> Vec<String>;

    /// Expand the `server:` prefix of a remote path for the copy command line
    fn remote_path(&self, target: &str, namespace: &str, path: &str) -> String;

    /// The filter suppressing this backend's own noise on exec streams
    fn noise_filter(&self) -> Box<dyn LogFilter>;
}
