//! # nodewatch Core
//!
//! State synchronization and participation key reconciliation engine for a
//! validator daemon.
//!
//! ## Architecture
//!
//! - **Status Tracker** ([`StatusTracker`]): fetches and merges daemon
//!   status and derives the `Stable | Syncing | FastCatchup` state machine
//! - **Metrics Sampler** ([`MetricsSampler`]): round time, TPS and byte rates
//! - **Catchpoint Controller** ([`CatchpointController`]): lag detection
//!   and fast-catchup commands
//! - **Participation Key Reconciler** ([`ParticipationKeys`],
//!   [`reconcile_accounts`], [`compare_keys`]): key operations and the
//!   per-account online status classification
//! - **Watch Loop** ([`StateModel::watch`]): the single driver, publishing
//!   to a [`Subscriber`]
//!
//! Collaborators are injected through [`NodeServices`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use nodewatch_core::{ChannelSubscriber, NodeServices, StateModel, WatchUpdate};
//! use nodewatch_config::WatchSettings;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(services: NodeServices) -> Result<(), nodewatch_core::WatchError> {
//! let mut model = StateModel::new(services, WatchSettings::default()).await?;
//! let (mut subscriber, mut updates) = ChannelSubscriber::channel(16);
//! let cancel = CancellationToken::new();
//!
//! tokio::spawn(async move { model.watch(&mut subscriber, cancel).await });
//! while let Some(update) = updates.recv().await {
//!     if let WatchUpdate::Snapshot(snapshot) = update {
//!         println!("round {}", snapshot.status.last_round);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod catchpoint;
pub mod clock;
pub mod error;
pub mod metrics;
pub mod participation;
pub mod services;
pub mod state;
pub mod status;
pub mod subscriber;

pub use accounts::{reconcile_accounts, Account, AccountStatus, KeyAnomaly, ReconcileContext};
pub use catchpoint::{
    ensure_not_catching_up, parse_catchpoint_round, CatchpointController, CatchpointReport,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{WatchError, WatchResult};
pub use metrics::{Metrics, MetricsSampler, RoundSample};
pub use participation::{
    compare_keys, find_key_id_for_vote_key, is_active_key, lora_deep_link, lora_network,
    remove_key_by_id, KeyComparison, KeyField, KeyRequest, ParticipationKeys, RangeType,
};
pub use services::NodeServices;
pub use state::{StateModel, StateSnapshot, StopHandle};
pub use status::{CatchpointProgress, Status, StatusState, StatusTracker, UpgradeProgress, UpgradeVote};
pub use subscriber::{ChannelSubscriber, Subscriber, WatchEvent, WatchUpdate};
