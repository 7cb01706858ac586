//! Service seams consumed by the watch engine.
//!
//! [`NodeApi`] covers every call made against the daemon, [`PublicFeed`] the
//! two public HTTP feeds. The engine only sees these traits so it can be
//! driven by scripted implementations in tests.

use crate::models::{
    AccountInformation, BlockHeader, CatchupStart, GenerateKeyParams, NodeStatus, NodeVersion,
    ParticipationKey,
};
use crate::RpcResult;
use async_trait::async_trait;

/// Daemon REST API
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Current node status
    async fn status(&self) -> RpcResult<NodeStatus>;

    /// Blocks server-side until a round after `round` exists (or the daemon times out)
    async fn wait_for_block_after(&self, round: u64) -> RpcResult<NodeStatus>;

    /// Build information of the running daemon
    async fn version(&self) -> RpcResult<NodeVersion>;

    /// Raw Prometheus exposition text of the daemon metrics endpoint
    async fn metrics_text(&self) -> RpcResult<String>;

    /// Header of the block at `round`
    async fn block_header(&self, round: u64) -> RpcResult<BlockHeader>;

    /// Every participation key held by the daemon (requires the admin token)
    async fn participation_keys(&self) -> RpcResult<Vec<ParticipationKey>>;

    /// A single participation key
    async fn participation_key(&self, id: &str) -> RpcResult<ParticipationKey>;

    /// Requests asynchronous generation of a key for `address`
    async fn generate_participation_keys(
        &self,
        address: &str,
        params: &GenerateKeyParams,
    ) -> RpcResult<()>;

    /// Deletes a participation key
    async fn delete_participation_key(&self, id: &str) -> RpcResult<()>;

    /// Live on-chain account record
    async fn account_information(&self, address: &str) -> RpcResult<AccountInformation>;

    /// Starts a fast-catchup to `catchpoint`
    async fn start_catchup(
        &self,
        catchpoint: &str,
        min_rounds: Option<u64>,
    ) -> RpcResult<CatchupStart>;

    /// Aborts a running fast-catchup
    async fn abort_catchup(&self, catchpoint: &str) -> RpcResult<String>;
}

/// Public catchpoint and release feeds
#[async_trait]
pub trait PublicFeed: Send + Sync {
    /// Latest catchpoint (`<round>#<checksum>`) of `network`
    async fn latest_catchpoint(&self, network: &str) -> RpcResult<String>;

    /// Newest release tag published on `channel`
    async fn latest_release(&self, channel: &str) -> RpcResult<String>;
}
