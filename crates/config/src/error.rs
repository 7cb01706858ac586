//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A file could not be read
    #[error("failed to read {path}: {message}")]
    Read {
        /// Offending file
        path: PathBuf,
        /// Underlying IO error
        message: String,
    },

    /// A file was read but could not be parsed
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Offending file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The path is not a daemon data directory
    #[error("invalid data directory: {0}")]
    InvalidDataDir(PathBuf),

    /// No data directory could be resolved for this platform
    #[error("unsupported operating system, pass a data directory explicitly")]
    UnsupportedPlatform,

    /// A setting holds a value the engine cannot work with
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
