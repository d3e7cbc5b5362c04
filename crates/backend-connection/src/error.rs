//! Error types for backend resolution and command execution

use thiserror::Error;

/// Unified error type for the connection layer
#[derive(Error, Debug)]
pub enum Error {
    /// The requested backend name is not recognized
    #[error("unknown backend: {name}")]
    UnknownBackend {
        /// The backend name that was requested
        name: String,
    },

    /// The requested backend is not compiled into this binary
    #[error("backend {name} is not available: this binary was built without {capability} support")]
    BackendUnavailable {
        /// The backend name that was requested
        name: String,
        /// The missing compiled-in capability
        capability: String,
    },

    /// The target container or pod could not be found
    #[error("target not found: {target}")]
    TargetNotFound {
        /// The container name or pod filter that matched nothing
        target: String,
    },

    /// More than one pod matched the filter
    #[error("filter {filter} matched {count} pods, expected exactly one")]
    AmbiguousTarget {
        /// The pod filter that was used
        filter: String,
        /// How many pods matched
        count: usize,
    },

    /// The Kubernetes namespace could not be determined
    #[error("failed to resolve namespace: {reason}")]
    NamespaceUnresolved {
        /// Why resolution failed
        reason: String,
    },

    /// The backend binary itself could not be started
    #[error("failed to launch {program}: {reason}")]
    LaunchFailed {
        /// The program that could not be launched
        program: String,
        /// The reason for the launch failure
        reason: String,
    },

    /// The remote command ran but exited with a non-zero code
    #[error("command exited with code {exit_code}: {output}")]
    CommandFailed {
        /// The exact exit code of the remote command
        exit_code: i32,
        /// The captured combined output, empty when output was streamed
        output: String,
    },

    /// Neither or both sides of a copy were marked as remote
    #[error("exactly one of {src} and {dst} must carry the server: prefix")]
    InvalidCopySpec {
        /// The source path as given
        src: String,
        /// The destination path as given
        dst: String,
    },

    /// A log command was requested without any log source
    #[error("no log source selected, specify at least one path")]
    NoLogSourceSelected,

    /// Several service operations failed
    #[error("{}", .errors.join("; "))]
    Aggregate {
        /// The individual failure messages, in attempt order
        errors: Vec<String>,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// For convenience, re-export specific error constructors
impl Error {
    /// Create a target not found error
    pub fn target_not_found(target: impl Into<String>) -> Self {
        Self::TargetNotFound {
            target: target.into(),
        }
    }

    /// Create a namespace resolution error
    pub fn namespace_unresolved(reason: impl Into<String>) -> Self {
        Self::NamespaceUnresolved {
            reason: reason.into(),
        }
    }

    /// Create a launch failed error
    pub fn launch_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LaunchFailed {
            program: program.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_reports_every_failure() {
        let err = Error::Aggregate {
            errors: vec![
                "failed to stop server".to_string(),
                "failed to stop db".to_string(),
            ],
        };

        assert_eq!(err.to_string(), "failed to stop server; failed to stop db");
    }
}
