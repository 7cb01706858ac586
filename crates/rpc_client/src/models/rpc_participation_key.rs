//! Participation key records.

use crate::utility::{base64_bytes, base64_bytes_opt};
use serde::{Deserialize, Serialize};

/// Key registration fields, shared by local key records and the live
/// on-chain participation record of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountParticipation {
    #[serde(with = "base64_bytes")]
    pub selection_participation_key: Vec<u8>,

    #[serde(with = "base64_bytes")]
    pub vote_participation_key: Vec<u8>,

    #[serde(default, with = "base64_bytes_opt", skip_serializing_if = "Option::is_none")]
    pub state_proof_key: Option<Vec<u8>>,

    pub vote_first_valid: u64,
    pub vote_last_valid: u64,
    pub vote_key_dilution: u64,
}

/// A participation key held by the daemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParticipationKey {
    /// Opaque key id
    pub id: String,

    /// Owning address
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_first_valid: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_last_valid: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_vote: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_block_proposal: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_state_proof: Option<u64>,

    /// Registration fields
    pub key: AccountParticipation,
}

/// Query parameters of a key generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateKeyParams {
    /// First valid round
    pub first: u64,
    /// Last valid round
    pub last: u64,
    /// Key dilution; the daemon picks one when absent
    pub dilution: Option<u64>,
}
