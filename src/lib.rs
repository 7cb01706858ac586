//! # nodewatch: validator daemon watcher
//!
//! Follows a running validator daemon round by round and keeps a model of
//! its state: sync state, throughput metrics, fast-catchup progress and the
//! online status of every account it holds participation keys for.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nodewatch::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let settings = WatchSettings::default();
//!     let endpoint = "http://127.0.0.1:8080".parse()?;
//!     let services = nodewatch::connect(endpoint, Some("token"), &settings)?;
//!
//!     let mut model = StateModel::new(services, settings).await?;
//!     let mut print = |event: WatchEvent<'_>| {
//!         if let WatchEvent::State(state) = event {
//!             println!("round {}", state.status.last_round);
//!         }
//!     };
//!     model.watch(&mut print, CancellationToken::new()).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - timing constants, settings and data directory resolution
//! - [`rpc_client`] - daemon REST client and public feeds
//! - [`core`] - status tracking, metrics, catchpoints, key reconciliation
//!   and the watch loop

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use nodewatch_config as config;
pub use nodewatch_core as core;
pub use nodewatch_rpc_client as rpc_client;

use std::sync::Arc;
use url::Url;

/// Common imports for nodewatch users
pub mod prelude {
    pub use crate::config::{DataDirConfig, WatchSettings};
    pub use crate::core::{
        Account, AccountStatus, ChannelSubscriber, Metrics, NodeServices, StateModel,
        StateSnapshot, Status, StatusState, Subscriber, WatchError, WatchEvent, WatchUpdate,
    };
    pub use crate::rpc_client::{FeedClient, NodeApi, PublicFeed, RpcClient, RpcError};
}

/// Result type for nodewatch operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// nodewatch library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the daemon client and the public feed client for `endpoint`
pub fn connect(
    endpoint: Url,
    token: Option<&str>,
    settings: &config::WatchSettings,
) -> Result<core::NodeServices> {
    let node = rpc_client::RpcClient::new(endpoint, token)?;
    let feed = rpc_client::FeedClient::from_settings(settings)?;
    Ok(core::NodeServices::new(Arc::new(node), Arc::new(feed)))
}
