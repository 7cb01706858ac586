//! Status Tracker
//!
//! Fetches raw daemon status and merges it into the [`Status`] the rest of
//! the engine reads. The [`StatusState`] is derived purely from the latest
//! raw response.

use crate::error::{WatchError, WatchResult};
use crate::services::NodeServices;
use nodewatch_config::WatchSettings;
use nodewatch_rpc_client::{NodeApi, NodeStatus, PublicFeed, RpcError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Synchronization state of the node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum StatusState {
    /// Following the network round by round
    #[default]
    Stable,
    /// Replaying blocks to catch up with the network
    Syncing,
    /// Applying a catchpoint
    FastCatchup,
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusState::Stable => write!(f, "RUNNING"),
            StatusState::Syncing => write!(f, "SYNCING"),
            StatusState::FastCatchup => write!(f, "FAST-CATCHUP"),
        }
    }
}

/// Fast-catchup progress counters, copied verbatim from the daemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatchpointProgress {
    pub total_accounts: Option<u64>,
    pub processed_accounts: Option<u64>,
    pub verified_accounts: Option<u64>,
    pub total_kvs: Option<u64>,
    pub processed_kvs: Option<u64>,
    pub verified_kvs: Option<u64>,
    pub total_blocks: Option<u64>,
    pub acquired_blocks: Option<u64>,
}

impl CatchpointProgress {
    fn from_raw(raw: &NodeStatus) -> Self {
        Self {
            total_accounts: raw.catchpoint_total_accounts,
            processed_accounts: raw.catchpoint_processed_accounts,
            verified_accounts: raw.catchpoint_verified_accounts,
            total_kvs: raw.catchpoint_total_kvs,
            processed_kvs: raw.catchpoint_processed_kvs,
            verified_kvs: raw.catchpoint_verified_kvs,
            total_blocks: raw.catchpoint_total_blocks,
            acquired_blocks: raw.catchpoint_acquired_blocks,
        }
    }
}

/// Protocol upgrade vote counters; all zero outside a vote window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeVote {
    pub rounds: u64,
    pub yes: u64,
    pub no: u64,
    pub total: u64,
    pub required: u64,
    pub next_version_round: u64,
}

/// Derived view of an ongoing upgrade vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeProgress {
    /// Share of the vote window already voted, in percent
    pub complete_percent: u64,
    pub yes_percent: u64,
    pub no_percent: u64,
    /// Yes votes already exceed the required count
    pub will_pass: bool,
    /// No votes already make the required count unreachable
    pub will_fail: bool,
}

/// Merged node status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub state: StatusState,
    /// Daemon version in release tag form
    pub version: String,
    /// Genesis id of the network, e.g. `mainnet-v1.0`
    pub network: String,
    pub last_round: u64,
    pub last_protocol_version: String,
    /// A newer release exists on the daemon's release channel
    pub needs_update: bool,
    pub catchpoint: Option<String>,
    pub catchpoint_progress: CatchpointProgress,
    pub sync_time: Duration,
    pub upgrade: UpgradeVote,
    /// Set when the last status call of the watch loop failed; cleared by the next merge
    pub down: bool,
}

impl Status {
    /// Merges a raw status response
    pub fn merge(&mut self, raw: &NodeStatus) {
        self.last_round = raw.last_round;
        self.last_protocol_version = raw.last_version.clone();

        match raw.catchpoint.as_deref() {
            Some(catchpoint) if !catchpoint.is_empty() => {
                self.state = StatusState::FastCatchup;
                self.catchpoint = Some(catchpoint.to_string());
                self.catchpoint_progress = CatchpointProgress::from_raw(raw);
                self.sync_time = Duration::from_nanos(raw.catchup_time);
            }
            _ => {
                self.catchpoint = None;
                self.catchpoint_progress = CatchpointProgress::default();
                if raw.catchup_time > 0 {
                    self.state = StatusState::Syncing;
                    self.sync_time = Duration::from_nanos(raw.catchup_time);
                } else {
                    self.state = StatusState::Stable;
                    self.sync_time = Duration::ZERO;
                }
            }
        }

        self.upgrade = if raw.upgrade_next_protocol_vote_before.is_some() {
            UpgradeVote {
                rounds: raw.upgrade_vote_rounds.unwrap_or_default(),
                yes: raw.upgrade_yes_votes.unwrap_or_default(),
                no: raw.upgrade_no_votes.unwrap_or_default(),
                total: raw.upgrade_votes.unwrap_or_default(),
                required: raw.upgrade_votes_required.unwrap_or_default(),
                next_version_round: raw.next_version_round,
            }
        } else {
            UpgradeVote::default()
        };

        self.down = false;
    }

    /// Vote progress, or `None` when no votes have been cast in the current window
    pub fn upgrade_progress(&self) -> Option<UpgradeProgress> {
        let vote = &self.upgrade;
        let cast = vote.yes.saturating_add(vote.no);
        if cast == 0 || vote.rounds == 0 {
            return None;
        }
        Some(UpgradeProgress {
            complete_percent: cast.saturating_mul(100) / vote.rounds,
            yes_percent: vote.yes.saturating_mul(100) / cast,
            no_percent: vote.no.saturating_mul(100) / cast,
            will_pass: vote.yes > vote.required,
            will_fail: vote.no > vote.rounds.saturating_sub(vote.required),
        })
    }

    /// Round at which an already approved upgrade takes effect
    pub fn scheduled_upgrade_round(&self) -> Option<u64> {
        let round = self.upgrade.next_version_round;
        (round > self.last_round.saturating_add(1)).then_some(round)
    }
}

/// Non-success status codes of status calls are reported as [`WatchError::InvalidStatus`]
fn status_error(err: RpcError) -> WatchError {
    match err {
        RpcError::Status { code, reason } => WatchError::InvalidStatus(format!("{code} {reason}")),
        other => WatchError::Rpc(other),
    }
}

/// Fetches and merges daemon status
#[derive(Clone)]
pub struct StatusTracker {
    node: Arc<dyn NodeApi>,
    feed: Arc<dyn PublicFeed>,
    settings: WatchSettings,
}

impl StatusTracker {
    pub fn new(services: &NodeServices, settings: &WatchSettings) -> Self {
        Self {
            node: services.node.clone(),
            feed: services.feed.clone(),
            settings: settings.clone(),
        }
    }

    /// Builds the initial status: version, network, update check, then a first [`get`](Self::get)
    pub async fn init(&self) -> WatchResult<Status> {
        let version = self.node.version().await.map_err(status_error)?;

        let mut status = Status {
            version: version.version_string(),
            network: version.genesis_id.clone(),
            ..Status::default()
        };

        let channel = version.channel();
        if self.settings.tracks_channel(channel) {
            match self.feed.latest_release(channel).await {
                Ok(tag) => {
                    status.needs_update = status.version != tag;
                    debug!(version = %status.version, latest = %tag, "release check");
                }
                Err(err) => warn!(%channel, error = %err, "release feed unavailable"),
            }
        }

        info!(version = %status.version, network = %status.network, "connected to daemon");
        self.get(&status).await
    }

    /// Fetches the current raw status and merges it into a copy of `status`
    pub async fn get(&self, status: &Status) -> WatchResult<Status> {
        let raw = self.node.status().await.map_err(status_error)?;
        let mut merged = status.clone();
        merged.merge(&raw);
        Ok(merged)
    }

    /// Blocks until the daemon reports a round after `status.last_round`, then merges
    pub async fn wait(&self, status: &Status) -> WatchResult<Status> {
        let raw = self
            .node
            .wait_for_block_after(status.last_round)
            .await
            .map_err(status_error)?;
        let mut merged = status.clone();
        merged.merge(&raw);
        debug!(round = merged.last_round, state = %merged.state, "round observed");
        Ok(merged)
    }
}
