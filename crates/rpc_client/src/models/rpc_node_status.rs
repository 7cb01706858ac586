//! Raw node status as returned by `/v2/status` and
//! `/v2/status/wait-for-block-after/{round}`.

use serde::{Deserialize, Serialize};

/// Raw status response
///
/// Durations are reported by the daemon in nanoseconds. Catchpoint counters
/// are only present while a fast-catchup is running and the upgrade fields
/// only inside a protocol upgrade vote window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NodeStatus {
    pub last_round: u64,
    pub last_version: String,
    pub next_version: String,
    pub next_version_round: u64,
    pub next_version_supported: bool,
    pub time_since_last_round: u64,
    pub catchup_time: u64,
    pub stopped_at_unsupported_round: bool,

    pub catchpoint: Option<String>,
    pub catchpoint_total_accounts: Option<u64>,
    pub catchpoint_processed_accounts: Option<u64>,
    pub catchpoint_verified_accounts: Option<u64>,
    pub catchpoint_total_kvs: Option<u64>,
    pub catchpoint_processed_kvs: Option<u64>,
    pub catchpoint_verified_kvs: Option<u64>,
    pub catchpoint_total_blocks: Option<u64>,
    pub catchpoint_acquired_blocks: Option<u64>,

    pub upgrade_next_protocol_vote_before: Option<u64>,
    pub upgrade_vote_rounds: Option<u64>,
    pub upgrade_yes_votes: Option<u64>,
    pub upgrade_no_votes: Option<u64>,
    pub upgrade_votes: Option<u64>,
    pub upgrade_votes_required: Option<u64>,
    pub upgrade_delay: Option<u64>,
    pub upgrade_node_vote: Option<bool>,
}
