//! Error types for the watch engine

use nodewatch_rpc_client::RpcError;
use thiserror::Error;

/// Errors surfaced by the watch engine
///
/// Domain failures are distinct variants so callers can special-case them;
/// transport and HTTP failures from the clients are carried in [`WatchError::Rpc`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("no catchpoint found")]
    NoCatchpoint,

    #[error("network {0} does not support fast catchup")]
    UnsupportedNetwork(String),

    #[error("invalid catchpoint: {0}")]
    InvalidCatchpoint(String),

    #[error("timeout waiting for key to be created")]
    KeyCreationTimeout,

    #[error("node is already catching up")]
    AlreadyCatchingUp,

    #[error("round time is unknown, metrics have not been sampled yet")]
    UnknownRoundTime,

    #[error("invalid key range: {0}")]
    InvalidRange(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl WatchError {
    /// Whether this is a domain error rather than a transport or cancellation failure
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Rpc(_) | Self::Cancelled)
    }

    /// Whether the error came from a daemon or feed call
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

/// Result type for engine operations
pub type WatchResult<T> = Result<T, WatchError>;
