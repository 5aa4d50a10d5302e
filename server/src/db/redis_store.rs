use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ActivitySnapshot, ActivityUpdate, PlayerId};
use redis::aio::ConnectionManager;
use redis::{Client, Script};
use tracing::{debug, info};

use super::models::{LogEntry, LogInsertOutcome, PlayerActivityRecord};
use super::{ActivityStore, StoreError};
use crate::redis_keys::RedisKeys;
use crate::redis_utils::create_connection_manager;

// Replaces the snapshot and clamps the timestamp in one step.
// KEYS[1] = player hash, ARGV[1] = snapshot json, ARGV[2] = now in ms.
const UPSERT_SCRIPT: &str = r#"
local now = tonumber(ARGV[2])
local prev = tonumber(redis.call('HGET', KEYS[1], 'updated_ms'))
if prev and prev > now then
    now = prev
end
redis.call('HSET', KEYS[1], 'doc', ARGV[1], 'updated_ms', now)
return now
"#;

// KEYS[1] = seen marker, KEYS[2] = log list, ARGV[1] = entry json.
const LOG_SCRIPT: &str = r#"
if redis.call('SET', KEYS[1], '1', 'NX') then
    redis.call('RPUSH', KEYS[2], ARGV[1])
    return 1
end
return 0
"#;

/// Activity store keeping one Redis hash per player.
#[derive(Clone)]
pub struct RedisActivityStore {
    redis: ConnectionManager,
    upsert_script: Script,
    log_script: Script,
}

impl RedisActivityStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            redis,
            upsert_script: Script::new(UPSERT_SCRIPT),
            log_script: Script::new(LOG_SCRIPT),
        }
    }

    /// Opens the process-wide connection. The URL is a secret and is kept
    /// out of error messages and logs.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).context("Invalid Redis connection string")?;
        let redis = create_connection_manager(client).await?;
        info!("Connected to Redis activity store");
        Ok(Self::new(redis))
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Backend(format!("stored timestamp out of range: {}", ms)))
}

#[async_trait]
impl ActivityStore for RedisActivityStore {
    async fn upsert_activity(
        &self,
        update: &ActivityUpdate,
        now: DateTime<Utc>,
    ) -> Result<PlayerActivityRecord, StoreError> {
        let snapshot = update.to_snapshot();
        let doc = serde_json::to_string(&snapshot)?;
        let key = RedisKeys::player_activity(&update.player_id);

        let mut conn = self.redis.clone();
        let stamped_ms: i64 = self
            .upsert_script
            .key(&key)
            .arg(doc)
            .arg(now.timestamp_millis())
            .invoke_async(&mut conn)
            .await?;

        debug!("Upserted {} at {}", key, stamped_ms);
        Ok(PlayerActivityRecord::from_snapshot(snapshot, from_millis(stamped_ms)?))
    }

    async fn get_activity(
        &self,
        player_id: &PlayerId,
    ) -> Result<Option<PlayerActivityRecord>, StoreError> {
        let mut conn = self.redis.clone();
        let (doc, updated_ms): (Option<String>, Option<i64>) = redis::cmd("HMGET")
            .arg(RedisKeys::player_activity(player_id))
            .arg("doc")
            .arg("updated_ms")
            .query_async(&mut conn)
            .await?;

        match (doc, updated_ms) {
            (Some(doc), Some(ms)) => {
                let snapshot: ActivitySnapshot = serde_json::from_str(&doc)?;
                Ok(Some(PlayerActivityRecord::from_snapshot(snapshot, from_millis(ms)?)))
            }
            _ => Ok(None),
        }
    }

    async fn record_log_event(&self, entry: &LogEntry) -> Result<LogInsertOutcome, StoreError> {
        let payload = serde_json::to_string(entry)?;

        let mut conn = self.redis.clone();
        let stored: i64 = self
            .log_script
            .key(RedisKeys::log_seen(&entry.fingerprint()))
            .key(RedisKeys::log_events())
            .arg(payload)
            .invoke_async(&mut conn)
            .await?;

        Ok(if stored == 1 {
            LogInsertOutcome::Stored
        } else {
            LogInsertOutcome::Duplicate
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.redis.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
