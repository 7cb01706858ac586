use super::print_json;
use crate::args::CatchupCommand;
use crate::connection::Connection;
use crate::CliError;
use anyhow::Result;
use nodewatch_core::{ensure_not_catching_up, CatchpointController, StatusState, StatusTracker};
use serde_json::json;
use tracing::info;

/// `nodewatch catchup ...`
pub async fn run(connection: Connection, action: CatchupCommand) -> Result<()> {
    let tracker = StatusTracker::new(&connection.services, &connection.settings);
    let catchpoints = CatchpointController::new(&connection.services, &connection.settings);
    let status = tracker.init().await?;

    match action {
        CatchupCommand::Start { catchpoint, min } => {
            ensure_not_catching_up(&status)?;
            let catchpoint = match catchpoint {
                Some(catchpoint) => catchpoint,
                None => catchpoints.latest_catchpoint(&status.network).await?,
            };
            println!("Latest catchpoint: {catchpoint}");
            let started = catchpoints.start_catchup(&catchpoint, min).await?;
            if started.newly_started {
                println!("Catchup started: {}", started.message);
            } else {
                println!("{}", started.message);
            }
        }
        CatchupCommand::Stop => {
            let catchpoint = match (&status.state, &status.catchpoint) {
                (StatusState::FastCatchup, Some(catchpoint)) if !catchpoint.is_empty() => {
                    catchpoint.clone()
                }
                _ => return Err(CliError::NotCatchingUp.into()),
            };
            let message = catchpoints.abort_catchup(&catchpoint).await?;
            println!("Catchpoint message: {message}");
        }
        CatchupCommand::Lagging => {
            let lagging = catchpoints
                .is_lagging(status.last_round, &status.network)
                .await?;
            let round = status.last_round;
            if lagging {
                println!("Node at round {round} is lagging, a fast-catchup is recommended");
            } else {
                println!("Node at round {round} is within catchpoint range");
            }
        }
        CatchupCommand::Debug => {
            let report = catchpoints.report(&status).await;
            info!("copy and paste the following to a bug report");
            print_json(&json!({ "status": status, "catchpoint": report }))?;
        }
    }
    Ok(())
}
