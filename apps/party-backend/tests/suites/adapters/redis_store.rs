//! Redis-backed store and supervisor against a live server.
//!
//! Skipped unless `TEST_REDIS_HOST` is set.

use std::sync::Arc;
use std::time::Duration;

use party_backend::config::StoreConfig;
use party_backend::infra::supervisor::{ConnectionSupervisor, ProbeOutcome};
use party_backend::services::succession::FirstByName;
use party_backend::store::{RedisConnector, RedisStore};
use party_backend::PartyManager;
use party_test_support::unique_helpers::unique_player;

use super::kv_conformance::run_all;

fn redis_config() -> Option<StoreConfig> {
    let host = std::env::var("TEST_REDIS_HOST").ok()?;
    let mut config = StoreConfig {
        host,
        timeout: Duration::from_millis(1000),
        ..StoreConfig::default()
    };
    if let Some(port) = std::env::var("TEST_REDIS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
    {
        config.port = port;
    }
    config.password = std::env::var("TEST_REDIS_PASSWORD").ok();
    if let Some(db) = std::env::var("TEST_REDIS_DB")
        .ok()
        .and_then(|d| d.parse().ok())
    {
        config.db = db;
    }
    Some(config)
}

async fn connect(config: &StoreConfig) -> Arc<ConnectionSupervisor<RedisConnector>> {
    let connector = RedisConnector::new(config).expect("valid redis config");
    ConnectionSupervisor::connect_only(connector, config.supervisor_settings())
        .await
        .expect("redis reachable")
}

#[tokio::test]
async fn redis_store_conforms() {
    let Some(config) = redis_config() else {
        eprintln!("TEST_REDIS_HOST not set; skipping");
        return;
    };
    let supervisor = connect(&config).await;
    let store = RedisStore::new(supervisor);

    run_all(&store).await;
}

#[tokio::test]
async fn forced_rebuild_keeps_store_usable() {
    let Some(config) = redis_config() else {
        eprintln!("TEST_REDIS_HOST not set; skipping");
        return;
    };
    let supervisor = connect(&config).await;
    let store = RedisStore::new(supervisor.clone());

    assert_eq!(supervisor.probe_once().await, ProbeOutcome::Healthy);
    assert_eq!(supervisor.force_rebuild().await, ProbeOutcome::Rebuilt);
    assert_eq!(supervisor.generation(), 1);

    run_all(&store).await;
}

#[tokio::test]
async fn party_flow_over_redis() {
    let Some(config) = redis_config() else {
        eprintln!("TEST_REDIS_HOST not set; skipping");
        return;
    };
    let supervisor = connect(&config).await;
    let parties = PartyManager::new(Arc::new(RedisStore::new(supervisor)))
        .with_succession(Box::new(FirstByName));

    let leader = unique_player("a");
    let member = unique_player("b");

    parties.create_party(&leader).await.unwrap();
    parties.invite_player(&leader, &member).await.unwrap();
    assert!(parties.accept_invite(&leader, &member).await.unwrap());
    assert!(parties.get_pending_invites(&member).await.unwrap().is_empty());

    parties.leave_party(&leader).await.unwrap();
    assert!(parties.is_player_leader(&member).await.unwrap());

    parties.disband_party(&member).await.unwrap();
    assert!(!parties.is_player_in_party(&member).await.unwrap());
}

#[tokio::test]
async fn unreachable_redis_fails_fast_as_unavailable() {
    let config = StoreConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        timeout: Duration::from_millis(500),
        ..StoreConfig::default()
    };
    let connector = RedisConnector::new(&config).expect("valid redis config");

    let result = ConnectionSupervisor::connect_only(connector, config.supervisor_settings()).await;
    match result {
        Err(err) => assert!(err.is_store_unavailable(), "unexpected error {err:?}"),
        Ok(_) => panic!("nothing listens on port 1"),
    }
}
