//! State model and watch loop

use crate::accounts::{accounts_from_keys, reconcile_accounts, Account, ReconcileContext};
use crate::catchpoint::CatchpointController;
use crate::clock::Clock;
use crate::error::{WatchError, WatchResult};
use crate::metrics::{Metrics, MetricsSampler};
use crate::participation::ParticipationKeys;
use crate::services::NodeServices;
use crate::status::{Status, StatusState, StatusTracker};
use crate::subscriber::Subscriber;
use nodewatch_config::WatchSettings;
use nodewatch_rpc_client::{NodeApi, ParticipationKey};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Owned copy of the observable state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub status: Status,
    pub metrics: Metrics,
    pub accounts: BTreeMap<String, Account>,
    pub participation_keys: Vec<ParticipationKey>,
    pub admin: bool,
    pub watching: bool,
}

/// Stops a running watch loop from another task
#[derive(Debug, Clone)]
pub struct StopHandle {
    watching: Arc<AtomicBool>,
}

impl StopHandle {
    /// Asks the loop to exit at its next iteration
    pub fn stop(&self) {
        self.watching.store(false, Ordering::SeqCst);
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }
}

/// The long-lived state of a watched daemon
pub struct StateModel {
    pub status: Status,
    pub metrics: Metrics,
    /// Accounts derived from the local keys, keyed by address
    pub accounts: BTreeMap<String, Account>,
    /// Raw key list of the last successful listing
    pub participation_keys: Vec<ParticipationKey>,
    /// Whether the daemon granted access to the key endpoints
    pub admin: bool,
    watching: Arc<AtomicBool>,
    settings: WatchSettings,
    node: Arc<dyn NodeApi>,
    clock: Arc<dyn Clock>,
    tracker: StatusTracker,
    sampler: MetricsSampler,
    keys: ParticipationKeys,
    catchpoints: CatchpointController,
}

impl StateModel {
    /// Connects to the daemon and loads the initial state
    ///
    /// Fails when the daemon version or status cannot be read. A failing
    /// metrics sample or key listing only degrades the initial state.
    pub async fn new(services: NodeServices, settings: WatchSettings) -> WatchResult<Self> {
        let tracker = StatusTracker::new(&services, &settings);
        let sampler = MetricsSampler::new(&services);
        let keys = ParticipationKeys::new(&services, &settings);
        let catchpoints = CatchpointController::new(&services, &settings);

        let status = tracker.init().await?;

        let empty = Metrics::new(settings.metrics_window);
        let metrics = match sampler.sample(&empty, status.last_round).await {
            Ok(metrics) => metrics,
            Err(err) => {
                warn!(error = %err, "initial metrics sample failed");
                empty
            }
        };

        let (participation_keys, admin) = match keys.list().await {
            Ok(list) => (list, true),
            Err(err) => {
                warn!(error = %err, "participation keys unavailable, admin access disabled");
                (Vec::new(), false)
            }
        };

        Ok(Self {
            status,
            metrics,
            accounts: accounts_from_keys(&participation_keys),
            participation_keys,
            admin,
            watching: Arc::new(AtomicBool::new(false)),
            settings,
            node: services.node,
            clock: services.clock,
            tracker,
            sampler,
            keys,
            catchpoints,
        })
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }

    /// Asks the watch loop to exit at its next iteration; an in-flight wait still completes
    pub fn stop(&self) {
        self.watching.store(false, Ordering::SeqCst);
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            watching: self.watching.clone(),
        }
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    pub fn status_tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    pub fn catchpoints(&self) -> &CatchpointController {
        &self.catchpoints
    }

    /// Key operations; the handle can be moved to another task
    pub fn keys(&self) -> &ParticipationKeys {
        &self.keys
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            status: self.status.clone(),
            metrics: self.metrics.clone(),
            accounts: self.accounts.clone(),
            participation_keys: self.participation_keys.clone(),
            admin: self.admin,
            watching: self.is_watching(),
        }
    }

    /// Refreshes the key list and reconciles every account
    ///
    /// When the key list cannot be read the admin flag is cleared and the
    /// previous keys and accounts are kept.
    pub async fn update_keys(&mut self) {
        let keys = match self.keys.list().await {
            Ok(keys) => keys,
            Err(err) => {
                if self.admin {
                    warn!(error = %err, "participation keys unavailable, admin access disabled");
                }
                self.admin = false;
                return;
            }
        };
        self.admin = true;

        let context = ReconcileContext {
            previous: &self.accounts,
            last_round: self.status.last_round,
            round_time: self.metrics.round_time,
            now: self.clock.now(),
        };
        let accounts = reconcile_accounts(self.node.as_ref(), &keys, context).await;
        debug!(keys = keys.len(), accounts = accounts.len(), "participation keys reconciled");

        self.accounts = accounts;
        self.participation_keys = keys;
    }

    /// Runs the watch loop until [`stop`](Self::stop) is called or `cancel` fires
    ///
    /// Errors of status and metrics calls are reported to the subscriber and
    /// followed by a backoff; they never end the loop.
    pub async fn watch<S>(&mut self, subscriber: &mut S, cancel: CancellationToken)
    where
        S: Subscriber + ?Sized,
    {
        self.watching.store(true, Ordering::SeqCst);
        info!(round = self.status.last_round, "watch loop started");

        match self.tracker.get(&self.status).await {
            Ok(status) => self.status = status,
            Err(err) => subscriber.on_error(&err).await,
        }

        loop {
            if !self.is_watching() || cancel.is_cancelled() {
                break;
            }

            if self.status.state == StatusState::FastCatchup {
                subscriber.on_state(self).await;
                if !pause(self.settings.catchup_poll_interval(), &cancel).await {
                    break;
                }
                match self.tracker.get(&self.status).await {
                    Ok(status) => self.status = status,
                    Err(err) => subscriber.on_error(&err).await,
                }
                subscriber.on_state(self).await;
                continue;
            }

            self.update_keys().await;
            subscriber.on_state(self).await;

            let waited = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.tracker.wait(&self.status) => result,
            };
            match waited {
                Ok(status) => self.status = status,
                Err(err) => {
                    if !self.report_down(subscriber, err, &cancel).await {
                        break;
                    }
                    continue;
                }
            }

            if self.status.state == StatusState::Syncing {
                subscriber.on_state(self).await;
                continue;
            }

            let interval = self.settings.metrics_round_interval.max(1);
            if self.status.last_round % interval == 0 {
                match self.sampler.sample(&self.metrics, self.status.last_round).await {
                    Ok(metrics) => self.metrics = metrics,
                    Err(err) => {
                        if !self.report_down(subscriber, err, &cancel).await {
                            break;
                        }
                        continue;
                    }
                }
            }

            subscriber.on_state(self).await;
        }

        self.watching.store(false, Ordering::SeqCst);
        info!("watch loop stopped");
    }

    /// Marks the node down, reports the error and backs off; `false` when cancelled
    async fn report_down<S>(
        &mut self,
        subscriber: &mut S,
        err: WatchError,
        cancel: &CancellationToken,
    ) -> bool
    where
        S: Subscriber + ?Sized,
    {
        warn!(error = %err, "daemon call failed");
        self.status.down = true;
        subscriber.on_error(&err).await;
        pause(self.settings.error_backoff(), cancel).await
    }
}

/// Sleeps for `duration`; `false` if cancelled first
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

impl fmt::Debug for StateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateModel")
            .field("status", &self.status)
            .field("metrics", &self.metrics)
            .field("accounts", &self.accounts)
            .field("participation_keys", &self.participation_keys.len())
            .field("admin", &self.admin)
            .field("watching", &self.is_watching())
            .finish_non_exhaustive()
    }
}
