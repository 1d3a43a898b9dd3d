//! Error types for mirror engine operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for mirror operations.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The job carried an empty distribution selector.
    #[error("distribution selector must not be empty")]
    EmptyDistribution,
    /// A proxmox composite selector could not be split into category and suite.
    #[error("malformed proxmox selector '{selector}'")]
    MalformedSelector {
        /// Selector payload provided by the caller.
        selector: String,
    },
    /// The proxmox category is not covered by the repository table.
    #[error("unknown proxmox category '{value}'")]
    UnknownCategory {
        /// Category payload provided by the caller.
        value: String,
    },
    /// The operating-system family label was not recognised.
    #[error("unknown os family '{value}'")]
    UnknownOsFamily {
        /// Family payload provided by the caller.
        value: String,
    },
    /// The destination tree could not be created or written.
    #[error("destination '{}' is not writable", path.display())]
    DestinationUnwritable {
        /// Destination directory that failed.
        path: PathBuf,
        /// Source IO error.
        #[source]
        source: io::Error,
    },
    /// An external transfer tool could not be spawned.
    #[error("failed to spawn '{tool}'")]
    Spawn {
        /// Binary name of the tool.
        tool: String,
        /// Source IO error.
        #[source]
        source: io::Error,
    },
    /// A filesystem operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        #[source]
        source: io::Error,
    },
    /// The engine worker is no longer accepting commands.
    #[error("mirror engine is shut down")]
    EngineClosed,
}

/// Convenience alias for mirror operation results.
pub type MirrorResult<T> = Result<T, MirrorError>;
