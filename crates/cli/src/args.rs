use crate::logging::{LogConfig, LogFormat};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use url::Url;

/// Command-line arguments for nodewatch
#[derive(Parser, Debug, Clone)]
#[command(
    name = "nodewatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Watch a validator daemon: status, metrics, fast-catchup and participation keys",
    long_about = "nodewatch follows a running daemon round by round, reports its sync state and throughput, drives fast-catchup and reconciles the participation keys it holds with the accounts registered on chain."
)]
pub struct CliArgs {
    /// Daemon data directory (defaults to $ALGORAND_DATA, then the platform default)
    #[arg(short = 'd', long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Daemon REST endpoint, bypassing the data directory
    #[arg(long, value_name = "URL", env = "NODEWATCH_ENDPOINT", global = true)]
    pub endpoint: Option<Url>,

    /// Daemon API token, used with --endpoint
    #[arg(long, value_name = "TOKEN", env = "NODEWATCH_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Watch settings file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// The log level
    #[arg(long = "log-level", value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// The log format
    #[arg(long = "log-format", value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the daemon status once
    Status(OutputArgs),

    /// Follow the daemon, printing one line per update until Ctrl+C
    Watch(OutputArgs),

    /// Manage fast-catchup
    Catchup {
        #[command(subcommand)]
        action: CatchupCommand,
    },

    /// Manage participation keys
    Keys {
        #[command(subcommand)]
        action: KeysCommand,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CatchupCommand {
    /// Start a fast-catchup to the latest (or the given) catchpoint
    Start {
        /// Catchpoint to use instead of the latest published one
        #[arg(value_name = "ROUND#CHECKSUM")]
        catchpoint: Option<String>,

        /// Only catch up when at least this many rounds behind
        #[arg(long, value_name = "ROUNDS")]
        min: Option<u64>,
    },

    /// Abort the running fast-catchup
    Stop,

    /// Report whether the node trails the latest catchpoint
    Lagging,

    /// Print status and catchpoint facts as JSON, for bug reports
    Debug,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum KeysCommand {
    /// List the participation keys held by the daemon
    List(OutputArgs),

    /// Generate a participation key and wait until the daemon lists it
    Generate {
        /// Account the key is generated for
        #[arg(long, value_name = "ADDRESS")]
        address: String,

        /// Validity window in rounds
        #[arg(long, value_name = "ROUNDS", conflicts_with = "days")]
        rounds: Option<u64>,

        /// Validity window in days, converted with the current round time
        #[arg(long, value_name = "DAYS")]
        days: Option<u64>,

        /// First valid round (defaults to the current round)
        #[arg(long, value_name = "ROUND")]
        first: Option<u64>,

        /// Key dilution (the daemon picks one when absent)
        #[arg(long, value_name = "DILUTION")]
        dilution: Option<u64>,
    },

    /// Delete a participation key
    Delete {
        /// Key id
        id: String,
    },

    /// Print a transaction wizard link registering the key online
    Link {
        /// Key id
        id: String,

        /// Link to take the account offline instead
        #[arg(long)]
        offline: bool,
    },
}

/// Log level enumeration
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace level logging
    Trace,
    /// Debug level logging
    Debug,
    /// Info level logging
    Info,
    /// Warning level logging
    Warn,
    /// Error level logging
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl CliArgs {
    /// Logging configuration derived from the global flags
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: tracing::Level::from(self.log_level).to_string().to_lowercase(),
            format: self.log_format,
            color: !self.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Trace), tracing::Level::TRACE);
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
        assert_eq!(tracing::Level::from(LogLevel::Info), tracing::Level::INFO);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert_eq!(tracing::Level::from(LogLevel::Error), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_config() {
        let args = CliArgs::parse_from(["nodewatch", "--log-level", "debug", "status"]);
        let config = args.log_config();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Text);
        assert!(config.color);

        let args = CliArgs::parse_from(["nodewatch", "status", "--no-color"]);
        assert!(!args.log_config().color);
    }
}
