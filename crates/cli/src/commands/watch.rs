use super::{cancel_on_ctrl_c, print_json};
use crate::connection::Connection;
use anyhow::Result;
use nodewatch_core::{AccountStatus, ChannelSubscriber, StateModel, StateSnapshot, WatchUpdate};
use serde_json::json;
use tracing::info;

/// Updates buffered between the loop and the printer
const UPDATE_BUFFER: usize = 16;

/// `nodewatch watch`
pub async fn run(connection: Connection, json: bool) -> Result<()> {
    let mut model = StateModel::new(connection.services, connection.settings).await?;
    let stop = model.stop_handle();
    let cancel = cancel_on_ctrl_c();
    let (mut subscriber, mut updates) = ChannelSubscriber::channel(UPDATE_BUFFER);

    let watch_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        model.watch(&mut subscriber, watch_cancel).await;
    });

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                stop.stop();
                break;
            }
            update = updates.recv() => match update {
                Some(update) => print_update(&update, json)?,
                None => break,
            },
        }
    }

    drop(updates);
    handle.await?;
    info!("watch finished");
    Ok(())
}

fn print_update(update: &WatchUpdate, json: bool) -> Result<()> {
    match (update, json) {
        (WatchUpdate::Snapshot(snapshot), true) => print_json(snapshot.as_ref()),
        (WatchUpdate::Error(err), true) => print_json(&json!({ "error": err.to_string() })),
        (WatchUpdate::Snapshot(snapshot), false) => {
            println!("{}", summary_line(snapshot));
            Ok(())
        }
        (WatchUpdate::Error(err), false) => {
            eprintln!("error: {err}");
            Ok(())
        }
    }
}

/// One line per published state
pub fn summary_line(snapshot: &StateSnapshot) -> String {
    let status = &snapshot.status;
    let metrics = &snapshot.metrics;
    let online = snapshot
        .accounts
        .values()
        .filter(|account| account.status == AccountStatus::Online)
        .count();

    let mut line = format!(
        "round {} {}{} | round time {:.2}s | {:.2} TPS | tx {} B/s | rx {} B/s",
        status.last_round,
        status.state,
        if status.down { " DOWN" } else { "" },
        metrics.round_time.as_secs_f64(),
        metrics.tps,
        metrics.tx_rate,
        metrics.rx_rate,
    );
    if snapshot.admin {
        line.push_str(&format!(
            " | accounts {}/{} online",
            online,
            snapshot.accounts.len()
        ));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodewatch_core::{Account, Metrics, Status, StatusState};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn snapshot() -> StateSnapshot {
        let mut metrics = Metrics::new(10);
        metrics.round_time = Duration::from_millis(2_850);
        metrics.tps = 12.5;
        metrics.tx_rate = 100;
        metrics.rx_rate = 200;

        let mut accounts = BTreeMap::new();
        accounts.insert(
            "A".to_string(),
            Account {
                address: "A".into(),
                status: AccountStatus::Online,
                ..Account::default()
            },
        );
        accounts.insert("B".to_string(), Account::default());

        StateSnapshot {
            status: Status {
                last_round: 77,
                ..Status::default()
            },
            metrics,
            accounts,
            participation_keys: Vec::new(),
            admin: true,
            watching: true,
        }
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(&snapshot()),
            "round 77 RUNNING | round time 2.85s | 12.50 TPS | tx 100 B/s | rx 200 B/s | accounts 1/2 online"
        );
    }

    #[test]
    fn test_summary_line_down_without_admin() {
        let mut snapshot = snapshot();
        snapshot.status.down = true;
        snapshot.status.state = StatusState::Syncing;
        snapshot.admin = false;
        assert_eq!(
            summary_line(&snapshot),
            "round 77 SYNCING DOWN | round time 2.85s | 12.50 TPS | tx 100 B/s | rx 200 B/s"
        );
    }
}
