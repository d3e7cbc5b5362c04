//! Service lifecycle control
//!
//! Systemd-style lifecycle operations against the services running inside
//! the target, reached through the connection. Instantiated template units
//! (`name@instance`) get idempotent stop semantics: stopping something that
//! was never started is expected to work during teardown sequences.

use tracing::info;

use crate::connection::Connection;
use crate::error::{Error, Result};

/// systemctl exit code for "unit not loaded"
const UNIT_NOT_LOADED: i32 = 5;

/// A reference to a service inside the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRef {
    /// A singleton service, one systemd unit
    Simple {
        /// The unit name without the `.service` suffix
        name: String,
    },
    /// A templated unit addressed by an instance suffix
    Instantiated {
        /// The template name without the `@` part
        name: String,
        /// The instance suffix, `*` addresses every active instance
        instance: String,
    },
}

impl ServiceRef {
    /// Reference a singleton service
    pub fn simple(name: impl Into<String>) -> Self {
        Self::Simple { name: name.into() }
    }

    /// Reference an instantiated template service
    pub fn instantiated(name: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::Instantiated {
            name: name.into(),
            instance: instance.into(),
        }
    }

    /// The systemd unit name this reference addresses
    pub fn unit_name(&self) -> String {
        match self {
            Self::Simple { name } => name.clone(),
            Self::Instantiated { name, instance } => format!("{name}@{instance}"),
        }
    }
}

/// Lifecycle operations on services inside the target
pub struct ServiceController<'a> {
    cnx: &'a mut Connection,
}

impl<'a> ServiceController<'a> {
    /// Create a controller operating through the given connection
    pub fn new(cnx: &'a mut Connection) -> Self {
        Self { cnx }
    }

    /// Start a service
    pub async fn start(&mut self, service: &ServiceRef) -> Result<()> {
        self.systemctl("start", service).await
    }

    /// Restart a service
    pub async fn restart(&mut self, service: &ServiceRef) -> Result<()> {
        self.systemctl("restart", service).await
    }

    /// Stop a service.
    ///
    /// Stopping an instantiated service that was never started is a success,
    /// not an error: stop must be safe to call unconditionally.
    pub async fn stop(&mut self, service: &ServiceRef) -> Result<()> {
        let result = self.systemctl("stop", service).await;
        match service {
            ServiceRef::Simple { .. } => result,
            ServiceRef::Instantiated { .. } => ignore_missing_unit(result),
        }
    }

    /// Stop every listed service, in declaration order.
    ///
    /// All services are attempted regardless of individual failures; the
    /// failures are joined into one aggregate error so the caller sees the
    /// complete picture.
    pub async fn stop_all(&mut self, services: &[ServiceRef]) -> Result<()> {
        let mut errors = Vec::new();
        for service in services {
            if let Err(err) = self.stop(service).await {
                errors.push(format!("failed to stop {}: {err}", service.unit_name()));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate { errors })
        }
    }

    async fn systemctl(&mut self, verb: &str, service: &ServiceRef) -> Result<()> {
        let unit = service.unit_name();
        info!("Running systemctl {verb} {unit} in the target");
        self.cnx.exec("systemctl", &[verb, unit.as_str()]).await?;
        Ok(())
    }
}

/// Treat "unit not loaded" as success; used for idempotent stop
fn ignore_missing_unit(result: Result<()>) -> Result<()> {
    match result {
        Err(Error::CommandFailed { exit_code, .. }) if exit_code == UNIT_NOT_LOADED => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::driver::RuntimeDriver;
    use crate::event::{LogFilter, NoOpFilter};
    use async_trait::async_trait;
    use std::io::Write;

    // Routes every exec through `sh <script> systemctl <verb> <unit>` so
    // lifecycle semantics can be exercised without a container runtime.
    struct ScriptedDriver {
        script: String,
    }

    #[async_trait]
    impl RuntimeDriver for ScriptedDriver {
        fn backend(&self) -> Backend {
            Backend::Podman
        }

        fn executable(&self) -> &'static str {
            "sh"
        }

        async fn resolve_target(&self, _namespace: &str) -> crate::error::Result<String> {
            Ok("target".to_string())
        }

        async fn resolve_namespace(&self, _requested: &str) -> crate::error::Result<String> {
            Ok(String::new())
        }

        fn exec_args(
            &self,
            _target: &str,
            _namespace: &str,
            _interactive: bool,
            _tty: bool,
        ) -> Vec<String> {
            vec![self.script.clone()]
        }

        fn copy_args(&self, src: &str, dst: &str, _namespace: &str) -> Vec<String> {
            vec![src.to_string(), dst.to_string()]
        }

        fn remote_path(&self, _target: &str, _namespace: &str, path: &str) -> String {
            path.to_string()
        }

        fn noise_filter(&self) -> Box<dyn LogFilter> {
            Box::new(NoOpFilter)
        }
    }

    #[test]
    fn test_stop_all_attempts_every_service_and_joins_failures() {
        smol::block_on(async {
            // The script sees "$1 $2 $3" = "systemctl stop <unit>" and only
            // lets the db unit stop cleanly.
            let mut script = tempfile::NamedTempFile::new().unwrap();
            writeln!(
                script,
                r#"case "$3" in db) exit 0 ;; *) echo "refused $3" >&2; exit 1 ;; esac"#
            )
            .unwrap();
            script.flush().unwrap();

            let driver = ScriptedDriver {
                script: script.path().display().to_string(),
            };
            let mut cnx = Connection::with_driver(Backend::Podman, Box::new(driver));

            let services = [
                ServiceRef::simple("server"),
                ServiceRef::simple("db"),
                ServiceRef::instantiated("hub-api", "*"),
            ];
            let err = ServiceController::new(&mut cnx)
                .stop_all(&services)
                .await
                .unwrap_err();

            match err {
                Error::Aggregate { errors } => {
                    assert_eq!(errors.len(), 2);
                    assert!(errors[0].contains("server"));
                    assert!(errors[1].contains("hub-api@*"));
                }
                other => panic!("expected Aggregate, got {other:?}"),
            }
        });
    }

    #[test]
    fn test_unit_names() {
        assert_eq!(ServiceRef::simple("db").unit_name(), "db");
        assert_eq!(
            ServiceRef::instantiated("attestation", "0").unit_name(),
            "attestation@0"
        );
        assert_eq!(
            ServiceRef::instantiated("attestation", "*").unit_name(),
            "attestation@*"
        );
    }

    #[test]
    fn test_ignore_missing_unit_passes_success() {
        assert!(ignore_missing_unit(Ok(())).is_ok());
    }

    #[test]
    fn test_ignore_missing_unit_swallows_not_loaded() {
        let result = ignore_missing_unit(Err(Error::CommandFailed {
            exit_code: UNIT_NOT_LOADED,
            output: "Unit attestation@0.service not loaded.".to_string(),
        }));
        assert!(result.is_ok());
    }

    #[test]
    fn test_ignore_missing_unit_keeps_real_failures() {
        let result = ignore_missing_unit(Err(Error::CommandFailed {
            exit_code: 1,
            output: "Job for db.service failed".to_string(),
        }));
        assert!(matches!(
            result,
            Err(Error::CommandFailed { exit_code: 1, .. })
        ));
    }
}
