//! Watch engine settings
//!
//! Every field has a default so a settings file only needs to name the
//! values it overrides.

use crate::{
    ConfigError, ConfigResult, CATCHPOINT_LAG_THRESHOLD, CATCHUP_POLL_INTERVAL,
    DEFAULT_CATCHPOINT_FEED_URL, DEFAULT_METRICS_WINDOW, DEFAULT_RELEASE_FEED_URL, ERROR_BACKOFF,
    KEY_CREATION_TIMEOUT, KEY_POLL_INTERVAL, METRICS_ROUND_INTERVAL, TRACKED_RELEASE_CHANNELS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Tunables for the watch loop, the samplers and the public feeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Number of samples kept by the metrics sampler
    pub metrics_window: usize,

    /// Metrics are sampled when `last_round % metrics_round_interval == 0`
    pub metrics_round_interval: u64,

    /// Pause between status polls during fast-catchup, in milliseconds
    pub catchup_poll_ms: u64,

    /// Pause after a reported error, in milliseconds
    pub error_backoff_ms: u64,

    /// Key list poll interval while generating a key, in milliseconds
    pub key_poll_ms: u64,

    /// Overall key generation deadline, in seconds
    pub key_creation_timeout_secs: u64,

    /// Lag (in rounds) above which a node is considered lagging
    pub catchpoint_lag_threshold: u64,

    /// Catchpoint feed base URL
    pub catchpoint_feed_url: String,

    /// Release feed URL
    pub release_feed_url: String,

    /// Release channels compared with the release feed
    pub tracked_channels: Vec<String>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            metrics_window: DEFAULT_METRICS_WINDOW,
            metrics_round_interval: METRICS_ROUND_INTERVAL,
            catchup_poll_ms: CATCHUP_POLL_INTERVAL.as_millis() as u64,
            error_backoff_ms: ERROR_BACKOFF.as_millis() as u64,
            key_poll_ms: KEY_POLL_INTERVAL.as_millis() as u64,
            key_creation_timeout_secs: KEY_CREATION_TIMEOUT.as_secs(),
            catchpoint_lag_threshold: CATCHPOINT_LAG_THRESHOLD,
            catchpoint_feed_url: DEFAULT_CATCHPOINT_FEED_URL.to_string(),
            release_feed_url: DEFAULT_RELEASE_FEED_URL.to_string(),
            tracked_channels: TRACKED_RELEASE_CHANNELS
                .iter()
                .map(|channel| channel.to_string())
                .collect(),
        }
    }
}

impl WatchSettings {
    /// Loads settings from a TOML file and validates them
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "watch settings loaded");
        Ok(settings)
    }

    /// Parses settings from TOML text and validates them
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let settings: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the engine cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.metrics_window == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "metrics_window",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.metrics_round_interval == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "metrics_round_interval",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.key_poll_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "key_poll_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the release feed is consulted for this channel
    pub fn tracks_channel(&self, channel: &str) -> bool {
        self.tracked_channels.iter().any(|tracked| tracked == channel)
    }

    pub fn catchup_poll_interval(&self) -> Duration {
        Duration::from_millis(self.catchup_poll_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn key_poll_interval(&self) -> Duration {
        Duration::from_millis(self.key_poll_ms)
    }

    pub fn key_creation_timeout(&self) -> Duration {
        Duration::from_secs(self.key_creation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = WatchSettings::default();
        assert_eq!(settings.metrics_window, 100);
        assert_eq!(settings.metrics_round_interval, 5);
        assert_eq!(settings.catchup_poll_interval(), Duration::from_secs(2));
        assert_eq!(settings.error_backoff(), Duration::from_secs(3));
        assert_eq!(settings.key_poll_interval(), Duration::from_secs(2));
        assert_eq!(settings.key_creation_timeout(), Duration::from_secs(1200));
        assert_eq!(settings.catchpoint_lag_threshold, 30_000);
        assert!(settings.tracks_channel("stable"));
        assert!(settings.tracks_channel("beta"));
        assert!(!settings.tracks_channel("dev"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = WatchSettings::from_toml_str("metrics_window = 20\n").unwrap();
        assert_eq!(settings.metrics_window, 20);
        assert_eq!(settings.metrics_round_interval, METRICS_ROUND_INTERVAL);
        assert_eq!(settings.catchpoint_feed_url, DEFAULT_CATCHPOINT_FEED_URL);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = WatchSettings::from_toml_str("metrics_window = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                field: "metrics_window",
                ..
            }
        ));
    }
}
