//! Daemon build information from `/versions`.

use serde::{Deserialize, Serialize};

/// Build details of the running daemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildVersion {
    pub major: u64,
    pub minor: u64,
    pub build_number: u64,
    pub branch: String,
    pub channel: String,
    pub commit_hash: String,
}

/// `/versions` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeVersion {
    pub build: BuildVersion,
    pub genesis_id: String,
    pub genesis_hash_b64: String,
    pub versions: Vec<String>,
}

impl NodeVersion {
    /// Version string in release tag form, e.g. `v3.27.0-stable`
    pub fn version_string(&self) -> String {
        format!(
            "v{}.{}.{}-{}",
            self.build.major, self.build.minor, self.build.build_number, self.build.channel
        )
    }

    /// Release channel the daemon was built from
    pub fn channel(&self) -> &str {
        &self.build.channel
    }
}
