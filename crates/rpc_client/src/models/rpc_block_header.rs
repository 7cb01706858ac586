//! Block header subset used for throughput sampling.

use serde::{Deserialize, Serialize};

/// Fields of a block header the metrics sampler needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Round of the block
    #[serde(rename = "rnd", default)]
    pub round: u64,

    /// Unix timestamp in seconds
    #[serde(rename = "ts", default)]
    pub timestamp: i64,

    /// Number of transactions committed up to and including this block
    #[serde(rename = "tc", default)]
    pub txn_counter: u64,
}

/// `/v2/blocks/{round}?header-only=true` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockHeaderResponse {
    pub block: BlockHeader,
}
