//! Driver implementations for the supported container runtimes

pub mod kubernetes;
pub mod podman;

pub use kubernetes::KubernetesDriver;
pub use podman::PodmanDriver;
