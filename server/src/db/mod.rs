pub mod memory;
pub mod models;
pub mod redis_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ActivityUpdate, PlayerId};
use thiserror::Error;

pub use memory::MemoryActivityStore;
pub use models::*;
pub use redis_store::RedisActivityStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (connection refused, dropped, timed out).
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store error: {0}")]
    Backend(String),
    #[error("failed to encode or decode document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_timeout()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
        {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

/// Persistence for player activity snapshots and relayed game logs.
///
/// Implementations are shared across all in-flight requests and must be safe
/// for concurrent use.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Replaces the snapshot stored for `update.player_id`, creating it if
    /// absent. The stored `last_update` is `now`, or the previous value if the
    /// clock went backwards, so it never decreases for a given player.
    async fn upsert_activity(
        &self,
        update: &ActivityUpdate,
        now: DateTime<Utc>,
    ) -> Result<PlayerActivityRecord, StoreError>;

    async fn get_activity(
        &self,
        player_id: &PlayerId,
    ) -> Result<Option<PlayerActivityRecord>, StoreError>;

    /// Appends `entry` to the log queue unless an entry with the same
    /// fingerprint was stored before.
    async fn record_log_event(&self, entry: &LogEntry) -> Result<LogInsertOutcome, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Timestamp to store given the previous one; never moves backwards.
pub(crate) fn stamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}
