//! Scripted daemon used by the engine tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nodewatch_core::{ManualClock, NodeServices};
use nodewatch_rpc_client::models::{BuildVersion, CatchupStart};
use nodewatch_rpc_client::{
    AccountInformation, AccountParticipation, BlockHeader, GenerateKeyParams, NodeApi,
    NodeStatus, NodeVersion, ParticipationKey, PublicFeed, RpcError, RpcResult,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Status,
    Wait(u64),
    Version,
    Metrics,
    BlockHeader(u64),
    ListKeys,
    GetKey(String),
    Generate(String, GenerateKeyParams),
    DeleteKey(String),
    Account(String),
    StartCatchup(String, Option<u64>),
    AbortCatchup(String),
}

/// Daemon fake answering from scripted queues
///
/// `status` repeats the last scripted answer once its queue is empty;
/// `wait_for_block_after` never returns once its queue is empty.
pub struct FakeNode {
    pub statuses: Mutex<VecDeque<RpcResult<NodeStatus>>>,
    pub last_status: Mutex<NodeStatus>,
    pub waits: Mutex<VecDeque<RpcResult<NodeStatus>>>,
    pub version: Mutex<NodeVersion>,
    pub metrics: Mutex<VecDeque<RpcResult<String>>>,
    pub key_lists: Mutex<VecDeque<RpcResult<Vec<ParticipationKey>>>>,
    pub keys: Mutex<Vec<ParticipationKey>>,
    pub accounts: Mutex<HashMap<String, RpcResult<AccountInformation>>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeNode {
    pub fn new(initial: NodeStatus) -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(initial),
            waits: Mutex::new(VecDeque::new()),
            version: Mutex::new(node_version("stable")),
            metrics: Mutex::new(VecDeque::new()),
            key_lists: Mutex::new(VecDeque::new()),
            keys: Mutex::new(Vec::new()),
            accounts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_status(&self, status: RpcResult<NodeStatus>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn push_wait(&self, status: RpcResult<NodeStatus>) {
        self.waits.lock().unwrap().push_back(status);
    }

    pub fn push_key_list(&self, keys: RpcResult<Vec<ParticipationKey>>) {
        self.key_lists.lock().unwrap().push_back(keys);
    }

    pub fn push_metrics(&self, exposition: RpcResult<String>) {
        self.metrics.lock().unwrap().push_back(exposition);
    }

    pub fn set_keys(&self, keys: Vec<ParticipationKey>) {
        *self.keys.lock().unwrap() = keys;
    }

    pub fn set_account(&self, address: &str, info: RpcResult<AccountInformation>) {
        self.accounts
            .lock()
            .unwrap()
            .insert(address.to_string(), info);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NodeApi for FakeNode {
    async fn status(&self) -> RpcResult<NodeStatus> {
        self.record(Call::Status);
        let next = self.statuses.lock().unwrap().pop_front();
        match next {
            Some(Ok(status)) => {
                *self.last_status.lock().unwrap() = status.clone();
                Ok(status)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self.last_status.lock().unwrap().clone()),
        }
    }

    async fn wait_for_block_after(&self, round: u64) -> RpcResult<NodeStatus> {
        self.record(Call::Wait(round));
        let next = self.waits.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    async fn version(&self) -> RpcResult<NodeVersion> {
        self.record(Call::Version);
        Ok(self.version.lock().unwrap().clone())
    }

    async fn metrics_text(&self) -> RpcResult<String> {
        self.record(Call::Metrics);
        let next = self.metrics.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok("algod_network_sent_bytes_total 1000\nalgod_network_received_bytes_total 2000\n"
                .to_string())
        })
    }

    async fn block_header(&self, round: u64) -> RpcResult<BlockHeader> {
        self.record(Call::BlockHeader(round));
        Ok(BlockHeader {
            round,
            timestamp: 1_700_000_000 + (round as i64) * 3,
            txn_counter: round * 10,
        })
    }

    async fn participation_keys(&self) -> RpcResult<Vec<ParticipationKey>> {
        self.record(Call::ListKeys);
        let next = self.key_lists.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.keys.lock().unwrap().clone()))
    }

    async fn participation_key(&self, id: &str) -> RpcResult<ParticipationKey> {
        self.record(Call::GetKey(id.to_string()));
        self.keys
            .lock()
            .unwrap()
            .iter()
            .find(|key| key.id == id)
            .cloned()
            .ok_or_else(|| RpcError::status(404, None))
    }

    async fn generate_participation_keys(
        &self,
        address: &str,
        params: &GenerateKeyParams,
    ) -> RpcResult<()> {
        self.record(Call::Generate(address.to_string(), *params));
        Ok(())
    }

    async fn delete_participation_key(&self, id: &str) -> RpcResult<()> {
        self.record(Call::DeleteKey(id.to_string()));
        Ok(())
    }

    async fn account_information(&self, address: &str) -> RpcResult<AccountInformation> {
        self.record(Call::Account(address.to_string()));
        self.accounts
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_else(|| {
                Ok(AccountInformation {
                    address: address.to_string(),
                    status: "Offline".to_string(),
                    ..AccountInformation::default()
                })
            })
    }

    async fn start_catchup(
        &self,
        catchpoint: &str,
        min_rounds: Option<u64>,
    ) -> RpcResult<CatchupStart> {
        self.record(Call::StartCatchup(catchpoint.to_string(), min_rounds));
        Ok(CatchupStart {
            message: catchpoint.to_string(),
            newly_started: true,
        })
    }

    async fn abort_catchup(&self, catchpoint: &str) -> RpcResult<String> {
        self.record(Call::AbortCatchup(catchpoint.to_string()));
        Ok(catchpoint.to_string())
    }
}

/// Feed answering with fixed values
pub struct StaticFeed {
    pub catchpoint: RpcResult<String>,
    pub release: RpcResult<String>,
}

impl Default for StaticFeed {
    fn default() -> Self {
        Self {
            catchpoint: Ok("4420000#IOL2OYMRVJRHEYYHCTVTKG3MK3OAF4OQ4TAAHKELC2DSJBE7LVCA".into()),
            release: Ok("v3.27.0-stable".into()),
        }
    }
}

#[async_trait]
impl PublicFeed for StaticFeed {
    async fn latest_catchpoint(&self, _network: &str) -> RpcResult<String> {
        self.catchpoint.clone()
    }

    async fn latest_release(&self, _channel: &str) -> RpcResult<String> {
        self.release.clone()
    }
}

pub fn node_version(channel: &str) -> NodeVersion {
    NodeVersion {
        build: BuildVersion {
            major: 3,
            minor: 27,
            build_number: 0,
            channel: channel.to_string(),
            ..BuildVersion::default()
        },
        genesis_id: "mainnet-v1.0".to_string(),
        ..NodeVersion::default()
    }
}

pub fn stable(round: u64) -> NodeStatus {
    NodeStatus {
        last_round: round,
        last_version: "future".to_string(),
        ..NodeStatus::default()
    }
}

pub fn syncing(round: u64) -> NodeStatus {
    NodeStatus {
        catchup_time: 5_000_000_000,
        ..stable(round)
    }
}

pub fn catching_up(round: u64) -> NodeStatus {
    NodeStatus {
        catchpoint: Some("4420000#IOL2OYMRVJRHEYYHCTVTKG3MK3OAF4OQ4TAAHKELC2DSJBE7LVCA".into()),
        catchpoint_total_accounts: Some(100),
        catchpoint_processed_accounts: Some(10),
        ..stable(round)
    }
}

pub fn transport_error() -> RpcError {
    RpcError::Transport("connection refused".to_string())
}

pub fn participation(first: u64, last: u64, dilution: u64, seed: u8) -> AccountParticipation {
    AccountParticipation {
        selection_participation_key: vec![seed; 32],
        vote_participation_key: vec![seed.wrapping_add(1); 32],
        state_proof_key: Some(vec![seed.wrapping_add(2); 64]),
        vote_first_valid: first,
        vote_last_valid: last,
        vote_key_dilution: dilution,
    }
}

pub fn key(id: &str, address: &str, participation: AccountParticipation) -> ParticipationKey {
    ParticipationKey {
        id: id.to_string(),
        address: address.to_string(),
        key: participation,
        ..ParticipationKey::default()
    }
}

pub fn online(address: &str, live: AccountParticipation) -> AccountInformation {
    AccountInformation {
        address: address.to_string(),
        amount: 1_000_000,
        status: "Online".to_string(),
        participation: Some(live),
        ..AccountInformation::default()
    }
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()))
}

pub fn services(node: Arc<FakeNode>, feed: impl PublicFeed + 'static) -> NodeServices {
    NodeServices::new(node, Arc::new(feed)).with_clock(clock())
}
