//! Service lifecycle commands
//!
//! The aggregate stop covers every service the server is composed of, in the
//! declaration order below, and reports all failures at once.

use anyhow::{Context, Result};
use backend_connection::{ServiceController, ServiceRef};

/// Every service the server is composed of, in stop attempt order.
///
/// Instantiated services use the `*` instance so all active replicas are
/// addressed; stopping them when none is running is a no-op.
fn known_services() -> Vec<ServiceRef> {
    vec![
        ServiceRef::simple("server"),
        ServiceRef::simple("db"),
        ServiceRef::instantiated("server-attestation", "*"),
        ServiceRef::instantiated("hub-api", "*"),
    ]
}

fn service_ref(name: &str, instance: Option<&str>) -> ServiceRef {
    match instance {
        Some(instance) => ServiceRef::instantiated(name, instance),
        None => ServiceRef::simple(name),
    }
}

/// Start a service
pub async fn start(backend: &str, service: &str, instance: Option<&str>) -> Result<i32> {
    let mut cnx = super::connect(backend)?;
    let service = service_ref(service, instance);
    ServiceController::new(&mut cnx)
        .start(&service)
        .await
        .with_context(|| format!("Failed to start {}", service.unit_name()))?;
    Ok(0)
}

/// Restart a service
pub async fn restart(backend: &str, service: &str, instance: Option<&str>) -> Result<i32> {
    let mut cnx = super::connect(backend)?;
    let service = service_ref(service, instance);
    ServiceController::new(&mut cnx)
        .restart(&service)
        .await
        .with_context(|| format!("Failed to restart {}", service.unit_name()))?;
    Ok(0)
}

/// Stop one service, or the whole server when no service is named
pub async fn stop(backend: &str, service: Option<&str>, instance: Option<&str>) -> Result<i32> {
    let mut cnx = super::connect(backend)?;
    let mut controller = ServiceController::new(&mut cnx);
    match service {
        Some(name) => {
            let service = service_ref(name, instance);
            controller
                .stop(&service)
                .await
                .with_context(|| format!("Failed to stop {}", service.unit_name()))?;
        }
        None => {
            controller
                .stop_all(&known_services())
                .await
                .context("Failed to stop the server")?;
        }
    }
    Ok(0)
}
