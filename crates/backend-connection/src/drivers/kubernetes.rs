//! Kubernetes runtime driver
//!
//! The pod name is never known in advance: it is looked up through a label
//! selector in the resolved namespace. Exec and copy also need the sidecar
//! container flag since the server pod carries more than one container.

use async_trait::async_trait;
use serde::Deserialize;

use crate::backend::Backend;
use crate::command::Command;
use crate::driver::RuntimeDriver;
use crate::error::{Error, Result};
use crate::event::{KubectlNoiseFilter, LogFilter};
use crate::runner;

/// Driver reaching a pod through kubectl
#[derive(Debug, Clone)]
pub struct KubernetesDriver {
    /// Label selector used to find the server pod
    filter: String,
    /// The container to address inside the pod
    container: String,
}

impl KubernetesDriver {
    /// Create a driver for the given label selector and in-pod container
    pub fn new(filter: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            container: container.into(),
        }
    }
}

#[async_trait]
impl RuntimeDriver for KubernetesDriver {
    fn backend(&self) -> Backend {
        Backend::Kubernetes
    }

    async fn resolve_target(&self, namespace: &str) -> Result<String> {
        let cmd = Command::builder("kubectl")
            .args(["get", "pod", "-l", self.filter.as_str(), "-n", namespace])
            .arg("-o=jsonpath={.items[*].metadata.name}")
            .build();
        let out = runner::run_captured(&cmd).await?;
        let out = String::from_utf8_lossy(&out);

        let mut names = out.split_whitespace();
        let Some(name) = names.next() else {
            return Err(Error::target_not_found(format!(
                "no pod labeled {} is running in namespace {}",
                self.filter, namespace
            )));
        };
        let extra = names.count();
        if extra > 0 {
            return Err(Error::AmbiguousTarget {
                filter: self.filter.clone(),
                count: extra + 1,
            });
        }
        Ok(name.to_string())
    }

    async fn resolve_namespace(&self, requested: &str) -> Result<String> {
        if !requested.is_empty() {
            return Ok(requested.to_string());
        }

        let cmd = Command::builder("kubectl")
            .args(["config", "view", "--minify", "-o", "json"])
            .build();
        let out = runner::run_captured(&cmd)
            .await
            .map_err(|e| Error::namespace_unresolved(e.to_string()))?;

        let config: MinifiedConfig = serde_json::from_slice(&out)
            .map_err(|e| Error::namespace_unresolved(format!("invalid kubectl output: {e}")))?;

        let namespace = config
            .contexts
            .first()
            .and_then(|entry| entry.context.namespace.clone())
            // A context without an explicit namespace targets "default".
            .unwrap_or_else(|| "default".to_string());
        Ok(namespace)
    }

    fn exec_args(
        &self,
        target: &str,
        namespace: &str,
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
        args.extend([
            "-n".to_string(),
            namespace.to_string(),
            "-c".to_string(),
            self.container.clone(),
            target.to_string(),
            "--".to_string(),
        ]);
        args
    }

    fn copy_args(&self, src: &str, dst: &str, namespace: &str) -> Vec<String> {
        vec![
            "cp".to_string(),
            "-c".to_string(),
            self.container.clone(),
            "-n".to_string(),
            namespace.to_string(),
            src.to_string(),
            dst.to_string(),
        ]
    }

    fn remote_path(&self, target: &str, namespace: &str, path: &str) -> String {
        format!("{namespace}/{target}:{path}")
    }

    fn noise_filter(&self) -> Box<dyn LogFilter> {
        Box::new(KubectlNoiseFilter)
    }
}

/// The part of `kubectl config view --minify -o json` we care about
#[derive(Debug, Deserialize)]
struct MinifiedConfig {
    #[serde(default)]
    contexts: Vec<ContextEntry>,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    context: ContextData,
}

#[derive(Debug, Deserialize)]
struct ContextData {
    namespace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_args_flags_before_separator() {
        let driver = KubernetesDriver::new("app=server", "server");
        assert_eq!(
            driver.exec_args("server-abc123", "prod", true, true),
            ["exec", "-i", "-t", "-n", "prod", "-c", "server", "server-abc123", "--"]
        );
    }

    #[test]
    fn test_exec_args_non_interactive() {
        let driver = KubernetesDriver::new("app=server", "server");
        assert_eq!(
            driver.exec_args("server-abc123", "prod", false, false),
            ["exec", "-n", "prod", "-c", "server", "server-abc123", "--"]
        );
    }

    #[test]
    fn test_exec_args_deterministic() {
        let driver = KubernetesDriver::new("app=server", "server");
        assert_eq!(
            driver.exec_args("pod", "ns", true, false),
            driver.exec_args("pod", "ns", true, false)
        );
    }

    #[test]
    fn test_copy_args() {
        let driver = KubernetesDriver::new("app=server", "server");
        assert_eq!(
            driver.copy_args("prod/pod:/a", "/b", "prod"),
            ["cp", "-c", "server", "-n", "prod", "prod/pod:/a", "/b"]
        );
    }

    #[test]
    fn test_remote_path_carries_namespace() {
        let driver = KubernetesDriver::new("app=server", "server");
        assert_eq!(driver.remote_path("pod", "prod", "/a"), "prod/pod:/a");
    }

    #[test]
    fn test_minified_config_parsing() {
        let json = r#"{"contexts":[{"name":"c","context":{"cluster":"x","namespace":"team-a"}}]}"#;
        let config: MinifiedConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.contexts[0].context.namespace.as_deref(),
            Some("team-a")
        );
    }

    #[test]
    fn test_minified_config_without_namespace() {
        let json = r#"{"contexts":[{"name":"c","context":{"cluster":"x"}}]}"#;
        let config: MinifiedConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.contexts[0].context.namespace, None);
    }
}
