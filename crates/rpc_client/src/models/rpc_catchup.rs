//! Catchup command responses.

use serde::{Deserialize, Serialize};

/// Body of `/v2/catchup/{catchpoint}` responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchupMessage {
    #[serde(rename = "catchup-message", default)]
    pub catchup_message: String,
}

/// Outcome of a start-catchup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchupStart {
    /// Human-readable message from the daemon
    pub message: String,
    /// `true` for 201 (a new catchup began), `false` for 200 (already on that catchpoint)
    pub newly_started: bool,
}
