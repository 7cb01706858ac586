use super::print_json;
use crate::connection::Connection;
use anyhow::Result;
use nodewatch_core::{CatchpointProgress, Status, StatusState, StatusTracker};

/// `nodewatch status`
pub async fn run(connection: Connection, json: bool) -> Result<()> {
    let tracker = StatusTracker::new(&connection.services, &connection.settings);
    let status = tracker.init().await?;

    if json {
        return print_json(&status);
    }
    for line in status_lines(&status) {
        println!("{line}");
    }
    Ok(())
}

/// Human readable rendering of a status
pub fn status_lines(status: &Status) -> Vec<String> {
    let mut lines = vec![
        format!("State:      {}", status.state),
        format!(
            "Version:    {}{}",
            status.version,
            if status.needs_update { " (update available)" } else { "" }
        ),
        format!("Network:    {}", status.network),
        format!("Round:      {}", status.last_round),
        format!("Protocol:   {}", status.last_protocol_version),
    ];

    match status.state {
        StatusState::Syncing => {
            lines.push(format!("Sync time:  {}s", status.sync_time.as_secs()));
        }
        StatusState::FastCatchup => {
            if let Some(catchpoint) = &status.catchpoint {
                lines.push(format!("Catchpoint: {catchpoint}"));
            }
            lines.extend(progress_lines(&status.catchpoint_progress));
        }
        StatusState::Stable => {}
    }

    if let Some(progress) = status.upgrade_progress() {
        let outlook = if progress.will_pass {
            " (will pass)"
        } else if progress.will_fail {
            " (will fail)"
        } else {
            ""
        };
        lines.push(format!(
            "Upgrade:    {}% voted, yes {}% no {}%{}",
            progress.complete_percent, progress.yes_percent, progress.no_percent, outlook
        ));
    }
    if let Some(round) = status.scheduled_upgrade_round() {
        lines.push(format!("Upgrade at: round {round}"));
    }
    lines
}

fn progress_lines(progress: &CatchpointProgress) -> Vec<String> {
    [
        ("Accounts", progress.processed_accounts, progress.total_accounts),
        ("KVs", progress.processed_kvs, progress.total_kvs),
        ("Blocks", progress.acquired_blocks, progress.total_blocks),
    ]
    .into_iter()
    .filter_map(|(label, done, total)| match (done, total) {
        (Some(done), Some(total)) if total > 0 => {
            Some(format!("{:<11} {done}/{total}", format!("{label}:")))
        }
        _ => None,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodewatch_core::UpgradeVote;

    #[test]
    fn test_stable_status_lines() {
        let status = Status {
            version: "v3.27.0-stable".into(),
            network: "mainnet-v1.0".into(),
            last_round: 42,
            needs_update: true,
            ..Status::default()
        };
        let lines = status_lines(&status);
        assert_eq!(lines[0], "State:      RUNNING");
        assert_eq!(lines[1], "Version:    v3.27.0-stable (update available)");
        assert_eq!(lines[3], "Round:      42");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_catchup_progress_lines() {
        let status = Status {
            state: StatusState::FastCatchup,
            catchpoint: Some("4420000#ABC".into()),
            catchpoint_progress: CatchpointProgress {
                total_accounts: Some(100),
                processed_accounts: Some(10),
                total_blocks: Some(0),
                acquired_blocks: Some(0),
                ..CatchpointProgress::default()
            },
            ..Status::default()
        };
        let lines = status_lines(&status);
        assert!(lines.contains(&"Catchpoint: 4420000#ABC".to_string()));
        assert!(lines.contains(&"Accounts:   10/100".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Blocks")));
    }

    #[test]
    fn test_upgrade_lines() {
        let status = Status {
            last_round: 100,
            upgrade: UpgradeVote {
                rounds: 100,
                yes: 40,
                no: 10,
                total: 10_000,
                required: 90,
                next_version_round: 200,
            },
            ..Status::default()
        };
        let lines = status_lines(&status);
        assert!(lines.contains(&"Upgrade:    50% voted, yes 80% no 20%".to_string()));
        assert!(lines.contains(&"Upgrade at: round 200".to_string()));
    }
}
