//! Data directory resolution tests

use nodewatch_config::{ConfigError, DataDirConfig, WatchSettings, MISSING_ENDPOINT};
use std::fs;
use tempfile::TempDir;

fn data_dir_with_genesis() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("genesis.json"),
        r#"{"network": "testnet", "id": "v1.0", "alloc": []}"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_full_data_dir() {
    let dir = data_dir_with_genesis();
    fs::write(dir.path().join("algod.admin.token"), "admintoken\n").unwrap();
    fs::write(dir.path().join("algod.token"), "plaintoken\n").unwrap();
    fs::write(dir.path().join("algod.net"), "[::]:8080\n").unwrap();
    fs::write(dir.path().join("algod.pid"), "4242\n").unwrap();

    let config = DataDirConfig::from_data_dir(dir.path()).unwrap();

    assert_eq!(config.token, "admintoken");
    assert_eq!(config.endpoint, "http://127.0.0.1:8080");
    assert_eq!(config.network, "testnet-v1.0");
    assert_eq!(config.pid, Some(4242));
    assert!(config.has_endpoint());
}

#[test]
fn test_stopped_daemon_has_no_endpoint() {
    let dir = data_dir_with_genesis();
    fs::write(dir.path().join("algod.token"), "plaintoken").unwrap();

    let config = DataDirConfig::from_data_dir(dir.path()).unwrap();

    assert_eq!(config.token, "plaintoken");
    assert_eq!(config.endpoint, MISSING_ENDPOINT);
    assert_eq!(config.pid, None);
    assert!(!config.has_endpoint());
}

#[test]
fn test_missing_genesis_is_rejected() {
    let dir = TempDir::new().unwrap();
    let err = DataDirConfig::from_data_dir(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDataDir(_)));
}

#[test]
fn test_missing_token_is_an_error() {
    let dir = data_dir_with_genesis();
    let err = DataDirConfig::from_data_dir(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_settings_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nodewatch.toml");
    fs::write(
        &path,
        r#"
metrics_window = 50
error_backoff_ms = 500
tracked_channels = ["stable"]
"#,
    )
    .unwrap();

    let settings = WatchSettings::load(&path).unwrap();
    assert_eq!(settings.metrics_window, 50);
    assert_eq!(settings.error_backoff_ms, 500);
    assert!(settings.tracks_channel("stable"));
    assert!(!settings.tracks_channel("beta"));
}

#[test]
fn test_settings_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "metrics_window = \"lots\"").unwrap();

    match WatchSettings::load(&path).unwrap_err() {
        ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}
