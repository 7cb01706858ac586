//! On-chain account information.

use super::AccountParticipation;
use serde::{Deserialize, Serialize};

/// Status string the daemon reports for accounts registered online
pub const ACCOUNT_STATUS_ONLINE: &str = "Online";

/// `/v2/accounts/{address}` response, limited to the fields reconciliation uses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountInformation {
    /// Account address
    pub address: String,

    /// Balance in micro units
    #[serde(default)]
    pub amount: u64,

    /// `Online`, `Offline` or `NotParticipating`
    #[serde(default)]
    pub status: String,

    /// Whether the account pays the incentive eligibility fee
    #[serde(default)]
    pub incentive_eligible: bool,

    /// Live participation record, present while keys are registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participation: Option<AccountParticipation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_proposed: Option<u64>,
}

impl AccountInformation {
    /// Whether the chain reports the account as online
    pub fn is_online(&self) -> bool {
        self.status == ACCOUNT_STATUS_ONLINE
    }
}
