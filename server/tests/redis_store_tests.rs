use anyhow::Result;
use chrono::{Duration, Utc};
use common::{ActivityUpdate, MovementState, PlayerId, Position};
use serde_json::json;
use server::db::{ActivityStore, LogEntry, LogInsertOutcome, RedisActivityStore};
use std::time::{SystemTime, UNIX_EPOCH};

async fn connect() -> Result<Option<RedisActivityStore>> {
    // Skip these tests if Redis is not available
    let Ok(url) = std::env::var("ACTIVITY_TEST_REDIS_URL") else {
        eprintln!("Skipping test: ACTIVITY_TEST_REDIS_URL not set");
        return Ok(None);
    };
    Ok(Some(RedisActivityStore::connect(&url).await?))
}

fn unique_player(test_name: &str) -> Result<PlayerId> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    Ok(PlayerId::parse(&format!("{}-{}", test_name, nanos))?)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redis_upsert_replaces_snapshot() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    store.ping().await?;
    let player = unique_player("replace")?;

    let full = ActivityUpdate::new(player.clone())
        .with_name("Alice")
        .with_position(Position::new(1.0, 2.0, 3.0))
        .with_state(MovementState::Walking)
        .with_online(true);
    let t0 = Utc::now();
    let created = store.upsert_activity(&full, t0).await?;
    assert_eq!(created.snapshot(), full.to_snapshot());

    let fetched = store.get_activity(&player).await?.expect("record should exist");
    assert_eq!(fetched, created);

    let offline = ActivityUpdate::new(player.clone()).with_online(false);
    let replaced = store.upsert_activity(&offline, t0 + Duration::seconds(60)).await?;
    assert_eq!(replaced.name, None);
    assert!(!replaced.online);
    assert!(replaced.last_update > created.last_update);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redis_timestamp_is_monotonic() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let player = unique_player("monotonic")?;
    let update = ActivityUpdate::new(player).with_online(true);

    let t0 = Utc::now();
    let first = store.upsert_activity(&update, t0).await?;
    let second = store
        .upsert_activity(&update, t0 - Duration::seconds(120))
        .await?;
    assert_eq!(second.last_update, first.last_update);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redis_missing_player_is_none() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    assert!(store.get_activity(&unique_player("absent")?).await?.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redis_log_dedup() -> Result<()> {
    let Some(store) = connect().await? else { return Ok(()) };
    let entry = LogEntry::new(
        "chat".to_string(),
        json!({"message": "hi", "username": unique_player("log")?.as_str()}),
        Some(json!(Utc::now().timestamp())),
    );

    assert_eq!(store.record_log_event(&entry).await?, LogInsertOutcome::Stored);
    assert_eq!(store.record_log_event(&entry).await?, LogInsertOutcome::Duplicate);
    Ok(())
}
