mod common;

use common::*;
use nodewatch_config::WatchSettings;
use nodewatch_core::{KeyRequest, ParticipationKeys, RangeType, WatchError};
use nodewatch_rpc_client::{GenerateKeyParams, RpcError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const ADDRESS: &str = "ALICE7Y2JOFGG2VGWUDJQGDLPNDYYGOHURSPOXX2NYEKWOZBHBV4PLDIFE";

fn keys(node: &Arc<FakeNode>, settings: WatchSettings) -> ParticipationKeys {
    ParticipationKeys::new(&services(node.clone(), StaticFeed::default()), &settings)
}

fn request(range: RangeType, window: u64) -> KeyRequest {
    KeyRequest {
        address: ADDRESS.to_string(),
        first: 1_000,
        window,
        range,
        dilution: None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_generated_key_is_found_by_polling() {
    let node = Arc::new(FakeNode::new(stable(1_000)));
    node.push_key_list(Ok(Vec::new()));
    node.push_key_list(Ok(vec![
        key("OTHER", ADDRESS, participation(1_000, 2_000, 100, 3)),
        key("NEW", ADDRESS, participation(1_000, 31_000, 173, 4)),
    ]));
    let started = Instant::now();

    let created = keys(&node, WatchSettings::default())
        .generate(
            &request(RangeType::Rounds, 30_000),
            Duration::ZERO,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(created.id, "NEW");
    assert_eq!(
        node.calls()[0],
        Call::Generate(
            ADDRESS.into(),
            GenerateKeyParams {
                first: 1_000,
                last: 31_000,
                dilution: None,
            }
        )
    );
    assert_eq!(node.count(|c| *c == Call::ListKeys), 2);
    assert!(started.elapsed() >= WatchSettings::default().key_poll_interval() * 2);
}

#[tokio::test(start_paused = true)]
async fn test_seconds_window_uses_round_time() {
    let node = Arc::new(FakeNode::new(stable(1_000)));
    node.set_keys(vec![key("NEW", ADDRESS, participation(1_000, 1_100, 10, 4))]);

    let created = keys(&node, WatchSettings::default())
        .generate(
            &request(RangeType::Seconds, 300),
            Duration::from_secs(3),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(created.key.vote_last_valid, 1_100);
}

#[tokio::test(start_paused = true)]
async fn test_missing_key_times_out() {
    let node = Arc::new(FakeNode::new(stable(1_000)));
    let settings = WatchSettings {
        key_creation_timeout_secs: 10,
        ..WatchSettings::default()
    };
    let started = Instant::now();

    let err = keys(&node, settings)
        .generate(
            &request(RangeType::Rounds, 30_000),
            Duration::ZERO,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err, WatchError::KeyCreationTimeout);
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert!(node.count(|c| *c == Call::ListKeys) >= 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_generation_stops_polling() {
    let node = Arc::new(FakeNode::new(stable(1_000)));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        trigger.cancel();
    });

    let err = keys(&node, WatchSettings::default())
        .generate(&request(RangeType::Rounds, 30_000), Duration::ZERO, &cancel)
        .await
        .unwrap_err();

    assert_eq!(err, WatchError::Cancelled);
    assert!(!err.is_domain());
}

#[tokio::test(start_paused = true)]
async fn test_list_failure_while_polling_is_returned() {
    let node = Arc::new(FakeNode::new(stable(1_000)));
    node.push_key_list(Err(RpcError::status(401, None)));

    let err = keys(&node, WatchSettings::default())
        .generate(
            &request(RangeType::Rounds, 30_000),
            Duration::ZERO,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, WatchError::Rpc(ref rpc) if rpc.is_unauthorized()));
}

#[tokio::test]
async fn test_invalid_window_never_reaches_the_daemon() {
    let node = Arc::new(FakeNode::new(stable(1_000)));
    let keys = keys(&node, WatchSettings::default());

    let err = keys
        .generate(
            &request(RangeType::Seconds, 86_400),
            Duration::ZERO,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, WatchError::UnknownRoundTime);

    let err = keys
        .generate(
            &request(RangeType::Rounds, 0),
            Duration::ZERO,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WatchError::InvalidRange(_)));
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn test_get_and_delete_reach_the_daemon() {
    let node = Arc::new(FakeNode::new(stable(1_000)));
    node.set_keys(vec![key("K1", ADDRESS, participation(1, 100, 10, 1))]);
    let keys = keys(&node, WatchSettings::default());

    assert_eq!(keys.get("K1").await.unwrap().address, ADDRESS);
    assert!(matches!(
        keys.get("missing").await,
        Err(WatchError::Rpc(RpcError::Status { code: 404, .. }))
    ));

    keys.delete("K1").await.unwrap();
    assert!(node.calls().contains(&Call::DeleteKey("K1".into())));
}
