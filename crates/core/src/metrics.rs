//! Metrics Sampler
//!
//! Derives round time, transactions per second and network byte rates from
//! the daemon's Prometheus counters and block headers. A bounded history of
//! round samples smooths the round time and TPS figures.

use crate::clock::Clock;
use crate::error::{WatchError, WatchResult};
use crate::services::NodeServices;
use chrono::{DateTime, Utc};
use nodewatch_rpc_client::utility::prometheus_counter;
use nodewatch_rpc_client::NodeApi;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cumulative bytes sent, as exposed by the daemon
pub const SENT_BYTES_COUNTER: &str = "algod_network_sent_bytes_total";

/// Cumulative bytes received, as exposed by the daemon
pub const RECEIVED_BYTES_COUNTER: &str = "algod_network_received_bytes_total";

/// One entry of the sampling history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundSample {
    pub at: DateTime<Utc>,
    pub round: u64,
    /// Transaction counter of the block header at `round`
    pub txn_counter: u64,
}

/// Throughput figures of the node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Maximum number of samples kept in `samples`
    pub window: usize,
    /// Average time between rounds over the history
    pub round_time: Duration,
    /// Cumulative bytes sent
    pub tx: u64,
    /// Cumulative bytes received
    pub rx: u64,
    /// Bytes sent per second since the previous sample
    pub tx_rate: u64,
    /// Bytes received per second since the previous sample
    pub rx_rate: u64,
    /// Transactions per second over the history
    pub tps: f64,
    pub last_sample: Option<DateTime<Utc>>,
    /// Counters of the previous sample, the base of the byte rates
    pub last_tx: u64,
    pub last_rx: u64,
    pub samples: VecDeque<RoundSample>,
}

impl Metrics {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            round_time: Duration::ZERO,
            tx: 0,
            rx: 0,
            tx_rate: 0,
            rx_rate: 0,
            tps: 0.0,
            last_sample: None,
            last_tx: 0,
            last_rx: 0,
            samples: VecDeque::with_capacity(window),
        }
    }

    /// Returns the metrics after recording one sample
    ///
    /// History is dropped when the round moves backwards, which happens when
    /// the daemon is restarted on a different ledger.
    pub fn record(&self, sample: RoundSample, tx: u64, rx: u64) -> Self {
        let mut next = self.clone();

        if next
            .samples
            .back()
            .map_or(false, |newest| sample.round < newest.round)
        {
            next.samples.clear();
        }
        if next.samples.back().map(|newest| newest.round) != Some(sample.round) {
            next.samples.push_back(sample);
        }
        while next.samples.len() > next.window.max(1) {
            next.samples.pop_front();
        }

        next.round_time = Duration::ZERO;
        next.tps = 0.0;
        if let (Some(oldest), Some(newest)) = (next.samples.front(), next.samples.back()) {
            let rounds = newest.round.saturating_sub(oldest.round);
            let elapsed = (newest.at - oldest.at).to_std().unwrap_or_default();
            if rounds > 0 && !elapsed.is_zero() {
                next.round_time = elapsed / rounds.min(u64::from(u32::MAX)) as u32;
                let txns = newest.txn_counter.saturating_sub(oldest.txn_counter);
                next.tps = txns as f64 / elapsed.as_secs_f64();
            }
        }

        next.tx_rate = 0;
        next.rx_rate = 0;
        if let Some(previous) = self.last_sample {
            let elapsed = (sample.at - previous).to_std().unwrap_or_default();
            if !elapsed.is_zero() {
                let secs = elapsed.as_secs_f64();
                next.tx_rate = (tx.saturating_sub(self.tx) as f64 / secs) as u64;
                next.rx_rate = (rx.saturating_sub(self.rx) as f64 / secs) as u64;
            }
        }

        next.last_tx = self.tx;
        next.last_rx = self.rx;
        next.tx = tx;
        next.rx = rx;
        next.last_sample = Some(sample.at);
        next
    }
}

/// Samples daemon counters into [`Metrics`]
#[derive(Clone)]
pub struct MetricsSampler {
    node: Arc<dyn NodeApi>,
    clock: Arc<dyn Clock>,
}

impl MetricsSampler {
    pub fn new(services: &NodeServices) -> Self {
        Self {
            node: services.node.clone(),
            clock: services.clock.clone(),
        }
    }

    /// Takes a sample at `last_round` and returns the updated metrics
    pub async fn sample(&self, metrics: &Metrics, last_round: u64) -> WatchResult<Metrics> {
        let exposition = self.node.metrics_text().await?;
        let tx = prometheus_counter(&exposition, SENT_BYTES_COUNTER).unwrap_or_default();
        let rx = prometheus_counter(&exposition, RECEIVED_BYTES_COUNTER).unwrap_or_default();

        let header = self.node.block_header(last_round).await?;
        let sample = RoundSample {
            at: self.clock.now(),
            round: last_round,
            txn_counter: header.txn_counter,
        };

        let next = metrics.record(sample, tx, rx);
        debug!(
            round = last_round,
            round_time_ms = next.round_time.as_millis() as u64,
            tps = next.tps,
            "metrics sampled"
        );
        Ok(next)
    }

    /// Estimates the round time from block timestamps `span` rounds apart
    ///
    /// Used when no sampling history exists yet, e.g. by one-shot commands.
    pub async fn estimate_round_time(&self, last_round: u64, span: u64) -> WatchResult<Duration> {
        let first_round = last_round.saturating_sub(span);
        let rounds = last_round - first_round;
        if rounds == 0 {
            return Err(WatchError::UnknownRoundTime);
        }
        let newest = self.node.block_header(last_round).await?;
        let oldest = self.node.block_header(first_round).await?;
        let seconds = newest.timestamp.saturating_sub(oldest.timestamp);
        if seconds <= 0 {
            return Err(WatchError::UnknownRoundTime);
        }
        Ok(Duration::from_secs(seconds as u64) / rounds.min(u64::from(u32::MAX)) as u32)
    }
}
