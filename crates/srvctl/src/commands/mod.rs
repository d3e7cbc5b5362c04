//! Subcommand implementations

pub mod cp;
pub mod exec;
pub mod logs;
pub mod service;
pub mod term;

use anyhow::Result;
use backend_connection::{Connection, select_backend};

/// The container name hosting the managed server, doubling as the in-pod
/// container name on Kubernetes.
pub const SERVER_CONTAINER: &str = "server";

/// Label selector used to find the server pod on Kubernetes
pub const SERVER_FILTER: &str = "app=server";

/// Build the connection for the requested backend.
///
/// The kubernetes capability is decided at compile time through the
/// `kubernetes` cargo feature and passed to the selector explicitly.
pub fn connect(backend: &str) -> Result<Connection> {
    let backend = select_backend(backend, cfg!(feature = "kubernetes"))?;
    Ok(Connection::new(backend, SERVER_CONTAINER, SERVER_FILTER))
}
