//! Wire models for the daemon REST API.

mod rpc_account;
mod rpc_block_header;
mod rpc_catchup;
mod rpc_node_status;
mod rpc_participation_key;
mod rpc_version;

pub use rpc_account::{AccountInformation, ACCOUNT_STATUS_ONLINE};
pub use rpc_block_header::{BlockHeader, BlockHeaderResponse};
pub use rpc_catchup::{CatchupMessage, CatchupStart};
pub use rpc_node_status::NodeStatus;
pub use rpc_participation_key::{AccountParticipation, GenerateKeyParams, ParticipationKey};
pub use rpc_version::{BuildVersion, NodeVersion};
