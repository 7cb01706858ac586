//! Participation key reconciliation
//!
//! Accounts are rebuilt every cycle from the local key list and the live
//! on-chain record of each address. The online status patch compares the
//! live record with every local key of the address and classifies the
//! result with [`compare_keys`].

use crate::participation::{compare_keys, KeyComparison, KeyField};
use chrono::{DateTime, Utc};
use nodewatch_rpc_client::{AccountInformation, AccountParticipation, NodeApi, ParticipationKey};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Participation status of an account as seen by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AccountStatus {
    Online,
    #[default]
    Offline,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Online => write!(f, "Online"),
            AccountStatus::Offline => write!(f, "Offline"),
        }
    }
}

/// Inconsistency between the live record and the local keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum KeyAnomaly {
    /// A live record exists but no local key shares a single field with it
    UnmatchedOnChainRecord,
    /// The closest local key differs from the live record in `fields`
    KeyMismatch { key_id: String, fields: Vec<KeyField> },
}

impl fmt::Display for KeyAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAnomaly::UnmatchedOnChainRecord => {
                write!(f, "on-chain participation record matches no local key")
            }
            KeyAnomaly::KeyMismatch { key_id, fields } => {
                let names: Vec<String> = fields.iter().map(ToString::to_string).collect();
                write!(f, "key {key_id} differs in {}", names.join(", "))
            }
        }
    }
}

/// An address holding local participation keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Account {
    pub address: String,
    pub status: AccountStatus,
    /// Balance in micro units
    pub balance: u64,
    pub incentive_eligible: bool,
    /// Predicted expiry of the earliest expiring local key
    pub expires_at: Option<DateTime<Utc>>,
    /// Number of local keys for this address
    pub key_count: usize,
    /// The registered key is not fully backed by local key material
    pub non_resident_key: bool,
    /// Registered on chain while the chain reports the account offline
    pub suspended: bool,
    /// Local key whose validity range equals the live record
    pub active_key_id: Option<String>,
    pub anomaly: Option<KeyAnomaly>,
    /// Live on-chain participation record
    pub participation: Option<AccountParticipation>,
}

impl Account {
    fn draft(address: &str) -> Self {
        Self {
            address: address.to_string(),
            ..Self::default()
        }
    }

    /// Copies balance, eligibility and the live participation record
    pub fn merge(&mut self, info: &AccountInformation) {
        self.balance = info.amount;
        self.incentive_eligible = info.incentive_eligible;
        self.participation = info.participation.clone();
    }

    /// Keeps the on-chain view of the previous cycle when the account query failed
    fn carry_on_chain_view(&mut self, previous: &Account) {
        self.status = previous.status;
        self.balance = previous.balance;
        self.incentive_eligible = previous.incentive_eligible;
        self.non_resident_key = previous.non_resident_key;
        self.suspended = previous.suspended;
        self.active_key_id = previous.active_key_id.clone();
        self.anomaly = previous.anomaly.clone();
        self.participation = previous.participation.clone();
    }

    /// Predicts when the earliest expiring key of this account runs out
    ///
    /// Left unset while the last round or the round time is unknown.
    pub fn update_expiry(
        &mut self,
        keys: &[&ParticipationKey],
        last_round: u64,
        round_time: Duration,
        now: DateTime<Utc>,
    ) {
        self.expires_at = None;
        if last_round == 0 || round_time.is_zero() {
            return;
        }
        let Some(earliest) = keys.iter().map(|key| key.key.vote_last_valid).min() else {
            return;
        };
        let remaining = earliest.saturating_sub(last_round);
        self.expires_at = i64::try_from(round_time.as_millis())
            .ok()
            .and_then(|millis| millis.checked_mul(i64::try_from(remaining).ok()?))
            .and_then(|millis| now.checked_add_signed(chrono::Duration::milliseconds(millis)));
    }

    /// Derives the online status from the live record and the local keys
    pub fn patch_online_status(&mut self, keys: &[&ParticipationKey], info: &AccountInformation) {
        self.non_resident_key = false;
        self.suspended = false;
        self.active_key_id = None;
        self.anomaly = None;

        let Some(live) = info.participation.as_ref() else {
            self.status = AccountStatus::Offline;
            return;
        };

        self.active_key_id = keys
            .iter()
            .find(|key| same_range(&key.key, live))
            .map(|key| key.id.clone());

        if !info.is_online() {
            self.suspended = true;
            self.status = AccountStatus::Offline;
            return;
        }

        let best = keys
            .iter()
            .map(|key| (*key, compare_keys(&key.key, live)))
            .max_by_key(|(key, comparison)| {
                (
                    comparison.match_count,
                    comparison.only_dilution_differs(),
                    same_range(&key.key, live),
                )
            });

        match best {
            Some((_, comparison)) if comparison.match_count == KeyField::ALL.len() => {
                self.status = AccountStatus::Online;
            }
            Some((key, comparison)) if comparison.only_dilution_differs() => {
                debug!(address = %self.address, key_id = %key.id, "tolerating dilution mismatch");
                self.status = AccountStatus::Online;
            }
            Some((key, KeyComparison { mismatched, match_count, .. })) if match_count > 0 => {
                self.status = AccountStatus::Online;
                self.non_resident_key = true;
                self.anomaly = Some(KeyAnomaly::KeyMismatch {
                    key_id: key.id.clone(),
                    fields: mismatched,
                });
            }
            _ => {
                self.status = AccountStatus::Offline;
                self.anomaly = Some(KeyAnomaly::UnmatchedOnChainRecord);
            }
        }
    }
}

fn same_range(local: &AccountParticipation, live: &AccountParticipation) -> bool {
    local.vote_first_valid == live.vote_first_valid && local.vote_last_valid == live.vote_last_valid
}

/// Groups keys by owning address into draft accounts
pub fn accounts_from_keys(keys: &[ParticipationKey]) -> BTreeMap<String, Account> {
    let mut accounts = BTreeMap::new();
    for key in keys {
        accounts
            .entry(key.address.clone())
            .or_insert_with(|| Account::draft(&key.address))
            .key_count += 1;
    }
    accounts
}

/// Inputs of one reconciliation pass besides the key list
#[derive(Debug, Clone, Copy)]
pub struct ReconcileContext<'a> {
    /// Accounts of the previous cycle
    pub previous: &'a BTreeMap<String, Account>,
    pub last_round: u64,
    pub round_time: Duration,
    pub now: DateTime<Utc>,
}

/// Rebuilds the account map from `keys` and the live on-chain records
///
/// A failing account query only affects that account: it keeps the
/// on-chain view of the previous cycle.
pub async fn reconcile_accounts(
    node: &dyn NodeApi,
    keys: &[ParticipationKey],
    context: ReconcileContext<'_>,
) -> BTreeMap<String, Account> {
    let mut accounts = accounts_from_keys(keys);

    for (address, account) in accounts.iter_mut() {
        let owned: Vec<&ParticipationKey> =
            keys.iter().filter(|key| &key.address == address).collect();

        account.update_expiry(&owned, context.last_round, context.round_time, context.now);

        match node.account_information(address).await {
            Ok(info) => {
                account.merge(&info);
                account.patch_online_status(&owned, &info);
                if let Some(anomaly) = &account.anomaly {
                    warn!(%address, %anomaly, "participation key anomaly");
                }
            }
            Err(err) => {
                warn!(%address, error = %err, "account query failed, keeping previous data");
                if let Some(previous) = context.previous.get(address) {
                    account.carry_on_chain_view(previous);
                }
            }
        }
    }

    accounts
}
