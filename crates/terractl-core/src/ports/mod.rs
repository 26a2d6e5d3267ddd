//! Seams between the coordinator and the host it manages.
//!
//! The core never spawns a process, opens a socket or reads an archive
//! itself. It asks a [`CommandRunner`] to run the server's scripts and
//! `supervisorctl`, a [`StateProbe`] whether the game server is up, a
//! [`DiskProbe`] for free space and an [`ArchiveLister`] for backup contents.
//! `terractl-runtime` supplies the real implementations; tests supply fakes.
//!
//! # Design Rules
//!
//! - No `tokio::process` or `sysinfo` types in any signature
//! - External commands are opaque: program, arguments, environment, timeout
//! - Probes are read-only and safe to call concurrently

pub mod archive_lister;
pub mod command_runner;
pub mod disk_probe;
pub mod state_probe;

use thiserror::Error;

pub use archive_lister::{ArchiveLister, NoopArchiveLister};
pub use command_runner::{CommandOutput, CommandRunner, CommandSpec, DEFAULT_COMMAND_TIMEOUT};
pub use disk_probe::DiskProbe;
pub use state_probe::StateProbe;

/// Core error type for semantic domain errors.
///
/// Every precondition failure is raised before any external command runs.
/// Adapters map variants to their own representation (HTTP status codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad or sanitized-to-empty name, missing field, out-of-range value.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced world, backup or log does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The resource the caller wants to create already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The managed process is in the wrong state for the requested mutation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An external command exited non-zero, timed out, or could not launch.
    #[error("{message}: {detail}")]
    ExternalFailure { message: String, detail: String },

    /// The external command reported success but the filesystem disagrees.
    #[error("{message}: {detail}")]
    PostconditionMismatch { message: String, detail: String },

    /// A direct filesystem mutation (remove, copy, truncate) failed.
    #[error("{message}: {detail}")]
    Storage { message: String, detail: String },
}

impl CoreError {
    /// Build an [`CoreError::ExternalFailure`] from a failed command,
    /// preferring stderr and falling back to stdout (ANSI-stripped).
    pub fn external(message: impl Into<String>, output: &CommandOutput) -> Self {
        Self::ExternalFailure {
            message: message.into(),
            detail: output.diagnostic(),
        }
    }

    /// Build a [`CoreError::Storage`] from an I/O failure.
    pub fn storage(message: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Storage {
            message: message.into(),
            detail: err.to_string(),
        }
    }
}
