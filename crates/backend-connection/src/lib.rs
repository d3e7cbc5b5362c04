//! Backend-agnostic execution and connection layer
//!
//! This crate lets administration commands operate identically whether the
//! managed server runs as a podman container or as a Kubernetes pod: one
//! connection façade, two runtime drivers behind it, a process runner with
//! exit-code transparency, service lifecycle control and remote log tailing.

#![warn(missing_docs)]

pub mod backend;
pub mod command;
pub mod connection;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod event;
pub mod logs;
pub mod runner;
pub mod service;

pub use backend::{Backend, select_backend};
pub use command::{Command, forward_env};
pub use connection::{Connection, REMOTE_PREFIX};
pub use driver::RuntimeDriver;
pub use error::{Error, Result};
pub use event::{KubectlNoiseFilter, LogFilter, LogSource, NoOpFilter};
pub use runner::ExitStatus;
pub use service::{ServiceController, ServiceRef};
