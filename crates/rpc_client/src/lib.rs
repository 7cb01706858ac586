//! nodewatch RPC Client Library
//!
//! REST client for the validator daemon ([`RpcClient`]) and for the public
//! catchpoint and release feeds ([`FeedClient`]). The watch engine talks to
//! both through the [`NodeApi`] and [`PublicFeed`] traits.

pub mod models;
mod feed_client;
mod node_api;
mod rpc_client;
mod rpc_error;
pub mod utility;

pub use feed_client::FeedClient;
pub use node_api::{NodeApi, PublicFeed};
pub use rpc_client::RpcClient;
pub use rpc_error::{RpcError, RpcResult};

// Re-export commonly used types
pub use models::{
    AccountInformation, AccountParticipation, BlockHeader, CatchupStart, GenerateKeyParams,
    NodeStatus, NodeVersion, ParticipationKey, ACCOUNT_STATUS_ONLINE,
};
