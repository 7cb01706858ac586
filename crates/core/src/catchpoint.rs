//! Catchpoint Controller

use crate::error::{WatchError, WatchResult};
use crate::services::NodeServices;
use crate::status::{Status, StatusState};
use nodewatch_config::WatchSettings;
use nodewatch_rpc_client::{CatchupStart, NodeApi, PublicFeed, RpcError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Round prefix of a `<round>#<checksum>` catchpoint
pub fn parse_catchpoint_round(catchpoint: &str) -> WatchResult<u64> {
    let (round, checksum) = catchpoint
        .split_once('#')
        .ok_or_else(|| WatchError::InvalidCatchpoint(catchpoint.to_string()))?;
    if checksum.is_empty() {
        return Err(WatchError::InvalidCatchpoint(catchpoint.to_string()));
    }
    round
        .parse::<u64>()
        .map_err(|_| WatchError::InvalidCatchpoint(catchpoint.to_string()))
}

/// Rejects a catchup request while one is already running
pub fn ensure_not_catching_up(status: &Status) -> WatchResult<()> {
    if status.state == StatusState::FastCatchup {
        return Err(WatchError::AlreadyCatchingUp);
    }
    Ok(())
}

/// Fast-catchup facts for a bug report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatchpointReport {
    /// False only when the catchpoint feed does not know the network
    pub supported: bool,
    pub running: bool,
    pub latest: Option<String>,
}

/// Fetches catchpoints and drives fast-catchup on the daemon
#[derive(Clone)]
pub struct CatchpointController {
    node: Arc<dyn NodeApi>,
    feed: Arc<dyn PublicFeed>,
    lag_threshold: u64,
}

impl CatchpointController {
    pub fn new(services: &NodeServices, settings: &WatchSettings) -> Self {
        Self {
            node: services.node.clone(),
            feed: services.feed.clone(),
            lag_threshold: settings.catchpoint_lag_threshold,
        }
    }

    /// Latest catchpoint published for `network`
    pub async fn latest_catchpoint(&self, network: &str) -> WatchResult<String> {
        let catchpoint = self
            .feed
            .latest_catchpoint(network)
            .await
            .map_err(|err| match err {
                RpcError::UnsupportedNetwork(network) => WatchError::UnsupportedNetwork(network),
                other => WatchError::Rpc(other),
            })?;
        if catchpoint.trim().is_empty() {
            return Err(WatchError::NoCatchpoint);
        }
        Ok(catchpoint)
    }

    /// Whether the latest catchpoint is more than the lag threshold ahead of `round`
    pub async fn is_lagging(&self, round: u64, network: &str) -> WatchResult<bool> {
        let catchpoint = self.latest_catchpoint(network).await?;
        let catchpoint_round = parse_catchpoint_round(&catchpoint)?;
        let delta = catchpoint_round.saturating_sub(round);
        debug!(round, catchpoint_round, delta, "catchpoint lag");
        Ok(delta > self.lag_threshold)
    }

    /// Starts a fast-catchup; callers check [`ensure_not_catching_up`] first
    pub async fn start_catchup(
        &self,
        catchpoint: &str,
        min_rounds: Option<u64>,
    ) -> WatchResult<CatchupStart> {
        parse_catchpoint_round(catchpoint)?;
        let started = self.node.start_catchup(catchpoint, min_rounds).await?;
        info!(%catchpoint, newly_started = started.newly_started, message = %started.message, "catchup requested");
        Ok(started)
    }

    /// Collects the fast-catchup state of a node with status `status`
    ///
    /// Feed failures other than an unknown network leave the report
    /// `supported` with no latest catchpoint.
    pub async fn report(&self, status: &Status) -> CatchpointReport {
        let latest = self.latest_catchpoint(&status.network).await;
        if let Err(err) = &latest {
            debug!(network = %status.network, error = %err, "no catchpoint for report");
        }
        CatchpointReport {
            supported: !matches!(latest, Err(WatchError::UnsupportedNetwork(_))),
            running: status.state == StatusState::FastCatchup,
            latest: latest.ok(),
        }
    }

    /// Aborts a running fast-catchup
    pub async fn abort_catchup(&self, catchpoint: &str) -> WatchResult<String> {
        let message = self.node.abort_catchup(catchpoint).await?;
        info!(%catchpoint, %message, "catchup aborted");
        Ok(message)
    }
}
