//! Log output of the `nodewatch` binary
//!
//! Everything goes to stderr; stdout is reserved for command output so
//! `--json` stays machine readable.

use crate::{CliError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Level filter and output shape taken from the global flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default directive, used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    /// ANSI colors for the text formats
    pub color: bool,
}

/// Shape of each log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-field human readable lines
    #[default]
    Text,
    /// One terse line per event
    Compact,
    /// One JSON object per event
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
            color: true,
        }
    }
}

impl LogConfig {
    /// `RUST_LOG` when set, the configured level otherwise
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    fn output_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer().with_writer(std::io::stderr);
        match self.format {
            LogFormat::Text => layer.with_ansi(self.color).boxed(),
            LogFormat::Compact => layer.compact().with_ansi(self.color).boxed(),
            LogFormat::Json => layer.json().with_ansi(false).boxed(),
        }
    }
}

/// Installs the global subscriber
pub fn init_logging(config: &LogConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(config.output_layer())
        .with(config.filter())
        .try_init()
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    tracing::debug!(level = %config.level, format = ?config.format, "logging initialized");
    Ok(())
}
