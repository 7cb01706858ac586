//! Errors raised by the daemon and feed clients.

use thiserror::Error;

/// Failure of a daemon or public feed call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The request never produced a response (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("{code} {reason}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Canonical reason phrase, or the server supplied message
        reason: String,
    },

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The endpoint could not be turned into a request URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The catchpoint feed does not know the network
    #[error("network {0} is not supported by the catchpoint feed")]
    UnsupportedNetwork(String),

    /// No release tag matched the channel
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
}

impl RpcError {
    /// Creates a status error from a response code and optional server message
    pub fn status(code: u16, message: Option<String>) -> Self {
        let reason = message.filter(|m| !m.is_empty()).unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(code)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("Unknown Status")
                .to_string()
        });
        Self::Status { code, reason }
    }

    /// HTTP status code, when the server produced one
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.code(), Some(401) | Some(403))
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::status(status.as_u16(), None)
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for RpcError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for client calls
pub type RpcResult<T> = Result<T, RpcError>;
