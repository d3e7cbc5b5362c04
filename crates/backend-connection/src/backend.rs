//! Backend selection
//!
//! The backend is chosen once per command invocation and never changes for
//! the lifetime of a connection. Whether Kubernetes support was compiled in
//! is passed explicitly so selection stays a pure function.

use crate::error::{Error, Result};

/// The container runtime hosting the managed server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// A podman container on the local host
    Podman,
    /// A pod in a Kubernetes cluster reached through kubectl
    Kubernetes,
}

impl Backend {
    /// The CLI executable used to reach this backend
    pub fn executable(&self) -> &'static str {
        match self {
            Backend::Podman => "podman",
            Backend::Kubernetes => "kubectl",
        }
    }
}

/// Validate the requested backend name and pick the concrete runtime.
///
/// An empty request defaults to podman, the common case for a standalone
/// install. Callers that want a different default resolve it before calling.
pub fn select_backend(requested: &str, kubernetes_built: bool) -> Result<Backend> {
    match requested {
        "" | "podman" => Ok(Backend::Podman),
        "kubectl" | "kubernetes" => {
            if kubernetes_built {
                Ok(Backend::Kubernetes)
            } else {
                Err(Error::BackendUnavailable {
                    name: requested.to_string(),
                    capability: "kubernetes".to_string(),
                })
            }
        }
        other => Err(Error::UnknownBackend {
            name: other.to_string(),
        }),
    }
}
