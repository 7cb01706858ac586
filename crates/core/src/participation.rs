//! Participation key operations and key comparison

use crate::error::{WatchError, WatchResult};
use crate::services::NodeServices;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use nodewatch_config::{WatchSettings, LORA_BASE_URL};
use nodewatch_rpc_client::{AccountParticipation, GenerateKeyParams, NodeApi, ParticipationKey};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Unit of the validity window of a key request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RangeType {
    Rounds,
    Seconds,
}

/// Parameters of a key generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequest {
    pub address: String,
    pub first: u64,
    /// Length of the validity window in `range` units
    pub window: u64,
    pub range: RangeType,
    pub dilution: Option<u64>,
}

impl KeyRequest {
    /// Resolves the request to first/last rounds
    ///
    /// Second based windows are converted with `round_time`.
    pub fn params(&self, round_time: Duration) -> WatchResult<GenerateKeyParams> {
        if self.window == 0 {
            return Err(WatchError::InvalidRange("window must be positive".into()));
        }
        let rounds = match self.range {
            RangeType::Rounds => self.window,
            RangeType::Seconds => {
                if round_time.is_zero() {
                    return Err(WatchError::UnknownRoundTime);
                }
                (Duration::from_secs(self.window).as_nanos() / round_time.as_nanos()) as u64
            }
        };
        if rounds == 0 {
            return Err(WatchError::InvalidRange(format!(
                "{} seconds is shorter than one round",
                self.window
            )));
        }
        let last = self
            .first
            .checked_add(rounds)
            .ok_or_else(|| WatchError::InvalidRange("last round overflows".into()))?;
        Ok(GenerateKeyParams {
            first: self.first,
            last,
            dilution: self.dilution,
        })
    }
}

/// List, fetch, generate and delete participation keys
#[derive(Clone)]
pub struct ParticipationKeys {
    node: Arc<dyn NodeApi>,
    poll_interval: Duration,
    creation_timeout: Duration,
}

impl ParticipationKeys {
    pub fn new(services: &NodeServices, settings: &WatchSettings) -> Self {
        Self {
            node: services.node.clone(),
            poll_interval: settings.key_poll_interval(),
            creation_timeout: settings.key_creation_timeout(),
        }
    }

    pub async fn list(&self) -> WatchResult<Vec<ParticipationKey>> {
        Ok(self.node.participation_keys().await?)
    }

    pub async fn get(&self, id: &str) -> WatchResult<ParticipationKey> {
        Ok(self.node.participation_key(id).await?)
    }

    pub async fn delete(&self, id: &str) -> WatchResult<()> {
        self.node.delete_participation_key(id).await?;
        info!(%id, "participation key deleted");
        Ok(())
    }

    /// Requests a key and polls the key list until it shows up
    ///
    /// The key is matched by address and exact first/last valid rounds.
    /// Fails with [`WatchError::KeyCreationTimeout`] once the creation
    /// timeout elapses and with [`WatchError::Cancelled`] when `cancel` fires.
    pub async fn generate(
        &self,
        request: &KeyRequest,
        round_time: Duration,
        cancel: &CancellationToken,
    ) -> WatchResult<ParticipationKey> {
        let params = request.params(round_time)?;
        self.node
            .generate_participation_keys(&request.address, &params)
            .await?;
        info!(address = %request.address, first = params.first, last = params.last, "generating participation key");

        tokio::select! {
            _ = cancel.cancelled() => Err(WatchError::Cancelled),
            result = timeout(self.creation_timeout, self.poll_for_key(&request.address, &params)) => {
                match result {
                    Ok(found) => found,
                    Err(_) => Err(WatchError::KeyCreationTimeout),
                }
            }
        }
    }

    async fn poll_for_key(
        &self,
        address: &str,
        params: &GenerateKeyParams,
    ) -> WatchResult<ParticipationKey> {
        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let keys = self.list().await?;
            if let Some(key) = keys.into_iter().find(|key| {
                key.address == address
                    && key.key.vote_first_valid == params.first
                    && key.key.vote_last_valid == params.last
            }) {
                return Ok(key);
            }
            debug!(%address, "participation key not ready");
        }
    }
}

/// Removes the key with `id` from `keys`
pub fn remove_key_by_id(keys: &mut Vec<ParticipationKey>, id: &str) -> Option<ParticipationKey> {
    let index = keys.iter().position(|key| key.id == id)?;
    Some(keys.remove(index))
}

/// Id of the key holding `vote_key`
pub fn find_key_id_for_vote_key<'a>(keys: &'a [ParticipationKey], vote_key: &[u8]) -> Option<&'a str> {
    keys.iter()
        .find(|key| key.key.vote_participation_key == vote_key)
        .map(|key| key.id.as_str())
}

/// Whether `key` is the one registered in the live record
pub fn is_active_key(key: &ParticipationKey, live: &AccountParticipation) -> bool {
    key.key.vote_participation_key == live.vote_participation_key
        && key.key.vote_first_valid == live.vote_first_valid
        && key.key.vote_last_valid == live.vote_last_valid
}

/// Explorer network name for a genesis id: version suffixes dropped, local
/// development networks mapped to `localnet`
pub fn lora_network(network: &str) -> String {
    let name = network.replacen("-v1.0", "", 1).replacen("-v1", "", 1);
    match name.as_str() {
        "dockernet" | "tuinet" => "localnet".to_string(),
        _ => name,
    }
}

/// Transaction wizard link that registers `key` online, or takes its
/// account offline when `offline` is set
pub fn lora_deep_link(network: &str, offline: bool, key: &ParticipationKey) -> String {
    // `[0]`, percent-encoded
    const INDEX: &str = "%5B0%5D";

    let mut params = vec![
        ("type", "keyreg".to_string()),
        ("sender", key.address.clone()),
    ];
    if !offline {
        let part = &key.key;
        params.push(("selkey", URL_SAFE_NO_PAD.encode(&part.selection_participation_key)));
        if let Some(state_proof) = &part.state_proof_key {
            params.push(("sprfkey", URL_SAFE_NO_PAD.encode(state_proof)));
        }
        params.push(("votekey", URL_SAFE_NO_PAD.encode(&part.vote_participation_key)));
        params.push(("votefst", part.vote_first_valid.to_string()));
        params.push(("votelst", part.vote_last_valid.to_string()));
        params.push(("votekd", part.vote_key_dilution.to_string()));
    }

    let query = params
        .iter()
        .map(|(name, value)| format!("{name}{INDEX}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{LORA_BASE_URL}/{}/transaction-wizard?{query}",
        lora_network(network)
    )
}

/// Registration fields compared between a local key and a live record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyField {
    VoteFirstValid,
    VoteLastValid,
    VoteKeyDilution,
    VoteParticipationKey,
    SelectionParticipationKey,
    StateProofKey,
}

impl KeyField {
    pub const ALL: [KeyField; 6] = [
        KeyField::VoteFirstValid,
        KeyField::VoteLastValid,
        KeyField::VoteKeyDilution,
        KeyField::VoteParticipationKey,
        KeyField::SelectionParticipationKey,
        KeyField::StateProofKey,
    ];

    fn matches(self, local: &AccountParticipation, live: &AccountParticipation) -> bool {
        match self {
            KeyField::VoteFirstValid => local.vote_first_valid == live.vote_first_valid,
            KeyField::VoteLastValid => local.vote_last_valid == live.vote_last_valid,
            KeyField::VoteKeyDilution => local.vote_key_dilution == live.vote_key_dilution,
            KeyField::VoteParticipationKey => {
                local.vote_participation_key == live.vote_participation_key
            }
            KeyField::SelectionParticipationKey => {
                local.selection_participation_key == live.selection_participation_key
            }
            KeyField::StateProofKey => local.state_proof_key == live.state_proof_key,
        }
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyField::VoteFirstValid => "Vote First Valid",
            KeyField::VoteLastValid => "Vote Last Valid",
            KeyField::VoteKeyDilution => "Vote Key Dilution",
            KeyField::VoteParticipationKey => "Vote Key",
            KeyField::SelectionParticipationKey => "Selection Key",
            KeyField::StateProofKey => "State Proof Key",
        };
        f.write_str(name)
    }
}

/// Outcome of [`compare_keys`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyComparison {
    /// Fields that differ, in [`KeyField::ALL`] order
    pub mismatched: Vec<KeyField>,
    pub is_different: bool,
    /// Number of matching fields, out of six
    pub match_count: usize,
}

impl KeyComparison {
    /// Five of six fields match and the dilution is the odd one out
    pub fn only_dilution_differs(&self) -> bool {
        self.mismatched == [KeyField::VoteKeyDilution]
    }
}

/// Compares a local key with the live on-chain record field by field
pub fn compare_keys(local: &AccountParticipation, live: &AccountParticipation) -> KeyComparison {
    let mismatched: Vec<KeyField> = KeyField::ALL
        .into_iter()
        .filter(|field| !field.matches(local, live))
        .collect();
    KeyComparison {
        is_different: !mismatched.is_empty(),
        match_count: KeyField::ALL.len() - mismatched.len(),
        mismatched,
    }
}
