//! Daemon data directory resolution
//!
//! The daemon writes its API token, listening address, genesis descriptor and
//! pid into its data directory. These are turned into the already-resolved
//! connection parameters the watch engine is constructed with.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the daemon data directory
pub const DATA_DIR_ENV: &str = "ALGORAND_DATA";

/// Endpoint reported when the daemon has not written its listening address
pub const MISSING_ENDPOINT: &str = "missing://endpoint";

const GENESIS_FILE: &str = "genesis.json";
const ADMIN_TOKEN_FILE: &str = "algod.admin.token";
const TOKEN_FILE: &str = "algod.token";
const ENDPOINT_FILE: &str = "algod.net";
const PID_FILE: &str = "algod.pid";

/// Connection parameters read from a daemon data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirConfig {
    /// Data directory path
    pub path: PathBuf,
    /// API token (admin token when present)
    pub token: String,
    /// HTTP endpoint, or [`MISSING_ENDPOINT`]
    pub endpoint: String,
    /// Network id, `<network>-<id>` from the genesis descriptor
    pub network: String,
    /// Daemon pid, when the daemon is running
    pub pid: Option<u32>,
}

#[derive(Deserialize)]
struct GenesisDescriptor {
    network: String,
    id: String,
}

impl DataDirConfig {
    /// Reads the connection parameters from `path`
    pub fn from_data_dir(path: &Path) -> ConfigResult<Self> {
        if !is_data_dir(path) {
            return Err(ConfigError::InvalidDataDir(path.to_path_buf()));
        }

        let token = read_token(path)?;
        let network = read_network(path)?;
        let endpoint = read_endpoint(path);
        let pid = read_pid(path);

        debug!(
            path = %path.display(),
            %endpoint,
            %network,
            running = pid.is_some(),
            "data directory resolved"
        );

        Ok(Self {
            path: path.to_path_buf(),
            token,
            endpoint,
            network,
            pid,
        })
    }

    /// Whether the daemon has published a listening address
    pub fn has_endpoint(&self) -> bool {
        self.endpoint != MISSING_ENDPOINT
    }
}

/// A data directory is a directory holding a genesis descriptor
pub fn is_data_dir(path: &Path) -> bool {
    path.is_dir() && path.join(GENESIS_FILE).is_file()
}

/// Picks the data directory: explicit path, then `ALGORAND_DATA`, then the platform default
pub fn resolve_data_dir(explicit: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(from_env) = std::env::var(DATA_DIR_ENV) {
        if !from_env.is_empty() {
            return Ok(PathBuf::from(from_env));
        }
    }
    if cfg!(target_os = "linux") {
        Ok(PathBuf::from("/var/lib/algorand"))
    } else if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|home| home.join(".algorand"))
            .ok_or(ConfigError::UnsupportedPlatform)
    } else {
        Err(ConfigError::UnsupportedPlatform)
    }
}

fn read_file(path: PathBuf) -> ConfigResult<String> {
    fs::read_to_string(&path).map_err(|e| ConfigError::Read {
        path,
        message: e.to_string(),
    })
}

fn read_token(dir: &Path) -> ConfigResult<String> {
    let admin = dir.join(ADMIN_TOKEN_FILE);
    let file = if admin.is_file() {
        admin
    } else {
        dir.join(TOKEN_FILE)
    };
    Ok(read_file(file)?.trim().to_string())
}

fn read_network(dir: &Path) -> ConfigResult<String> {
    let path = dir.join(GENESIS_FILE);
    let content = read_file(path.clone())?;
    let genesis: GenesisDescriptor =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path,
            message: e.to_string(),
        })?;
    Ok(format!("{}-{}", genesis.network, genesis.id))
}

fn read_endpoint(dir: &Path) -> String {
    match fs::read_to_string(dir.join(ENDPOINT_FILE)) {
        Ok(address) => format!("http://{}", normalize_listen_address(address.trim())),
        Err(_) => MISSING_ENDPOINT.to_string(),
    }
}

fn read_pid(dir: &Path) -> Option<u32> {
    fs::read_to_string(dir.join(PID_FILE))
        .ok()
        .and_then(|pid| pid.trim().parse().ok())
}

/// Wildcard listen addresses are not dialable, map them to loopback
fn normalize_listen_address(address: &str) -> String {
    address
        .replacen("[::]", "127.0.0.1", 1)
        .replacen("0.0.0.0", "127.0.0.1", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_listen_address() {
        assert_eq!(normalize_listen_address("[::]:8080"), "127.0.0.1:8080");
        assert_eq!(normalize_listen_address("0.0.0.0:4001"), "127.0.0.1:4001");
        assert_eq!(normalize_listen_address("10.0.0.2:8080"), "10.0.0.2:8080");
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let path = Path::new("/tmp/node/data");
        assert_eq!(resolve_data_dir(Some(path)).unwrap(), path);
    }
}
