use super::{cancel_on_ctrl_c, print_json};
use crate::args::KeysCommand;
use crate::connection::Connection;
use crate::CliError;
use anyhow::Result;
use nodewatch_core::{lora_deep_link, KeyRequest, MetricsSampler, ParticipationKeys, RangeType};
use nodewatch_rpc_client::ParticipationKey;
use std::time::Duration;
use tracing::info;

const SECONDS_PER_DAY: u64 = 86_400;

/// Rounds of block history used to estimate the round time
const ROUND_TIME_SPAN: u64 = 100;

/// `nodewatch keys ...`
pub async fn run(connection: Connection, action: KeysCommand) -> Result<()> {
    let keys = ParticipationKeys::new(&connection.services, &connection.settings);

    match action {
        KeysCommand::List(output) => {
            let list = keys.list().await?;
            if output.json {
                return print_json(&list);
            }
            println!("{}", header_line());
            for key in &list {
                println!("{}", key_line(key));
            }
        }
        KeysCommand::Generate {
            address,
            rounds,
            days,
            first,
            dilution,
        } => {
            let (window, range) = match (rounds, days) {
                (Some(rounds), _) => (rounds, RangeType::Rounds),
                (None, Some(days)) => (days.saturating_mul(SECONDS_PER_DAY), RangeType::Seconds),
                (None, None) => return Err(CliError::MissingKeyRange.into()),
            };

            let last_round = connection.services.node.status().await?.last_round;
            let round_time = match range {
                RangeType::Seconds => {
                    MetricsSampler::new(&connection.services)
                        .estimate_round_time(last_round, ROUND_TIME_SPAN)
                        .await?
                }
                RangeType::Rounds => Duration::ZERO,
            };
            info!(round_time_ms = round_time.as_millis() as u64, "round time for key window");

            let request = KeyRequest {
                address,
                first: first.unwrap_or(last_round),
                window,
                range,
                dilution,
            };
            println!(
                "Generating participation key for {}, this can take a while",
                request.address
            );
            let key = keys.generate(&request, round_time, &cancel_on_ctrl_c()).await?;
            println!("{}", header_line());
            println!("{}", key_line(&key));
        }
        KeysCommand::Delete { id } => {
            keys.delete(&id).await?;
            println!("Deleted participation key {id}");
        }
        KeysCommand::Link { id, offline } => {
            let key = keys.get(&id).await?;
            let network = connection.services.node.version().await?.genesis_id;
            println!("{}", lora_deep_link(&network, offline, &key));
        }
    }
    Ok(())
}

fn header_line() -> String {
    format!(
        "{:<52} {:<58} {:>10} {:>10} {:>8}",
        "ID", "ADDRESS", "FIRST", "LAST", "DILUTION"
    )
}

/// One table row per key
pub fn key_line(key: &ParticipationKey) -> String {
    format!(
        "{:<52} {:<58} {:>10} {:>10} {:>8}",
        key.id,
        key.address,
        key.key.vote_first_valid,
        key.key.vote_last_valid,
        key.key.vote_key_dilution
    )
}
