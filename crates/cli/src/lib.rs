//! nodewatch CLI Library
//!
//! This crate provides the `nodewatch` command-line interface: flag parsing,
//! logging setup, connection resolution and the individual commands.

use std::path::PathBuf;
use thiserror::Error;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// The logging subscriber could not be installed
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The data directory does not name a listening address
    #[error("daemon is not running: no endpoint published in {}", .0.display())]
    NotRunning(PathBuf),

    /// A stop was requested while no fast-catchup runs
    #[error("node is not in fast catchup state")]
    NotCatchingUp,

    /// Neither a round nor a day count was given for a key
    #[error("either --rounds or --days is required")]
    MissingKeyRange,
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

pub mod args;
pub mod commands;
pub mod connection;
pub mod logging;

pub use args::CliArgs;
pub use connection::Connection;
