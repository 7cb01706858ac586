//! nodewatch Configuration Module
//!
//! This crate holds the timing constants shared by the watch engine, the
//! TOML-backed [`WatchSettings`] and the resolution of a daemon data
//! directory into connection parameters ([`DataDirConfig`]).

mod data_dir;
mod error;
mod settings;

pub use data_dir::{resolve_data_dir, DataDirConfig, DATA_DIR_ENV, MISSING_ENDPOINT};
pub use error::{ConfigError, ConfigResult};
pub use settings::WatchSettings;

use std::time::Duration;

/// Rounds a node may trail the latest catchpoint before it is considered lagging
pub const CATCHPOINT_LAG_THRESHOLD: u64 = 30_000;

/// Default number of samples kept by the metrics sampler
pub const DEFAULT_METRICS_WINDOW: usize = 100;

/// Metrics are sampled when the last round is a multiple of this value
pub const METRICS_ROUND_INTERVAL: u64 = 5;

/// Pause between status polls while a fast-catchup is running
pub const CATCHUP_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Pause after the watch loop reports an error
pub const ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Interval between key list polls while waiting for a generated key
pub const KEY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Overall deadline for a participation key to show up after generation
pub const KEY_CREATION_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Release channels for which the daemon version is compared with the public release feed
pub const TRACKED_RELEASE_CHANNELS: &[&str] = &["stable", "beta"];

/// Public catchpoint feed; the network id is appended to this base
pub const DEFAULT_CATCHPOINT_FEED_URL: &str = "https://afmetrics.api.nodely.io/v1/api/catchpoint/";

/// Public release feed listing daemon release tags, newest first
pub const DEFAULT_RELEASE_FEED_URL: &str =
    "https://api.github.com/repos/algorand/go-algorand/releases";

/// Block explorer hosting the key registration transaction wizard
pub const LORA_BASE_URL: &str = "https://lora.algokit.io";

/// Header carrying the daemon API token
pub const API_TOKEN_HEADER: &str = "X-Algo-API-Token";
