//! Command implementations

pub mod catchup;
pub mod keys;
pub mod status;
pub mod watch;

use crate::args::{CliArgs, Command};
use crate::connection::Connection;
use anyhow::Result;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Runs the selected command against the daemon
pub async fn run(args: CliArgs) -> Result<()> {
    let connection = Connection::open(&args)?;
    match args.command {
        Command::Status(output) => status::run(connection, output.json).await,
        Command::Watch(output) => watch::run(connection, output.json).await,
        Command::Catchup { action } => catchup::run(connection, action).await,
        Command::Keys { action } => keys::run(connection, action).await,
    }
}

/// Token cancelled by the first Ctrl+C
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received (Ctrl+C)");
                trigger.cancel();
            }
            Err(err) => error!(error = %err, "failed to wait for shutdown signal"),
        }
    });
    cancel
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
