//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file '{}'", path.display())]
    Io {
        /// Path of the file that failed.
        path: PathBuf,
        /// Source IO error.
        #[source]
        source: io::Error,
    },
    /// Configuration file was not valid TOML for the expected schema.
    #[error("failed to parse configuration file '{}'", path.display())]
    Parse {
        /// Path of the file that failed.
        path: PathBuf,
        /// Source deserialisation error.
        #[source]
        source: toml::de::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field [{section}] {field}: {reason}")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
