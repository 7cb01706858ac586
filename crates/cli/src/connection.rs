//! Turns the global flags into daemon clients and watch settings

use crate::{CliArgs, CliError};
use anyhow::{Context, Result};
use nodewatch_config::{resolve_data_dir, DataDirConfig, WatchSettings};
use nodewatch_core::NodeServices;
use nodewatch_rpc_client::{FeedClient, RpcClient};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Everything a command needs to talk to the daemon
#[derive(Debug)]
pub struct Connection {
    pub services: NodeServices,
    pub settings: WatchSettings,
    pub endpoint: Url,
}

impl Connection {
    /// Loads the settings, resolves the endpoint and builds the clients
    pub fn open(args: &CliArgs) -> Result<Self> {
        let settings = load_settings(args)?;
        let (endpoint, token) = resolve_endpoint(args)?;

        let node = RpcClient::new(endpoint.clone(), token.as_deref())
            .with_context(|| format!("cannot create a client for {endpoint}"))?;
        let feed = FeedClient::from_settings(&settings).context("invalid feed URL in settings")?;
        info!(%endpoint, "using daemon");

        Ok(Self {
            services: NodeServices::new(Arc::new(node), Arc::new(feed)),
            settings,
            endpoint,
        })
    }
}

/// Settings from `--config`, or the defaults
pub fn load_settings(args: &CliArgs) -> Result<WatchSettings> {
    let settings = match &args.config {
        Some(path) => WatchSettings::load(path)?,
        None => WatchSettings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

/// Endpoint and token: `--endpoint`/`--token` win over the data directory
pub fn resolve_endpoint(args: &CliArgs) -> Result<(Url, Option<String>)> {
    if let Some(endpoint) = &args.endpoint {
        debug!(%endpoint, "endpoint given on the command line");
        return Ok((endpoint.clone(), args.token.clone()));
    }

    let path = resolve_data_dir(args.data_dir.as_deref())?;
    let data_dir = DataDirConfig::from_data_dir(&path)?;
    if !data_dir.has_endpoint() {
        return Err(CliError::NotRunning(path).into());
    }
    let endpoint = Url::parse(&data_dir.endpoint)
        .with_context(|| format!("invalid endpoint {} in {}", data_dir.endpoint, path.display()))?;
    let token = args.token.clone().or(Some(data_dir.token));
    Ok((endpoint, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn data_dir(with_endpoint: bool) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("genesis.json"),
            r#"{"network":"testnet","id":"v1.0"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("algod.token"), "a".repeat(64)).unwrap();
        if with_endpoint {
            fs::write(dir.path().join("algod.net"), "127.0.0.1:8080\n").unwrap();
        }
        dir
    }

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["nodewatch"];
        argv.extend_from_slice(extra);
        argv.push("status");
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let args = args(&["--endpoint", "http://10.0.0.1:4001", "--token", "secret"]);
        let (endpoint, token) = resolve_endpoint(&args).unwrap();
        assert_eq!(endpoint.as_str(), "http://10.0.0.1:4001/");
        assert_eq!(token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_endpoint_from_data_dir() {
        let dir = data_dir(true);
        let args = args(&["--data-dir", dir.path().to_str().unwrap()]);
        let (endpoint, token) = resolve_endpoint(&args).unwrap();
        assert_eq!(endpoint.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(token, Some("a".repeat(64)));
    }

    #[test]
    fn test_stopped_daemon_is_reported() {
        let dir = data_dir(false);
        let args = args(&["--data-dir", dir.path().to_str().unwrap()]);
        let err = resolve_endpoint(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::NotRunning(_))
        ));
    }

    #[test]
    fn test_settings_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nodewatch.toml");
        fs::write(&path, "metrics_window = 20\n").unwrap();
        let args = args(&["--config", path.to_str().unwrap()]);
        assert_eq!(load_settings(&args).unwrap().metrics_window, 20);
    }
}
