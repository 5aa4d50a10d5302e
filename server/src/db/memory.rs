use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ActivityUpdate, PlayerId};
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, RwLock};

use super::models::{LogEntry, LogInsertOutcome, PlayerActivityRecord};
use super::{ActivityStore, StoreError, stamp};

#[derive(Default)]
struct LogQueue {
    seen: HashSet<String>,
    entries: Vec<LogEntry>,
}

/// In-process store with the same semantics as the Redis store.
#[derive(Default)]
pub struct MemoryActivityStore {
    records: RwLock<HashMap<PlayerId, PlayerActivityRecord>>,
    logs: Mutex<LogQueue>,
}

impl MemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn log_entries(&self) -> Vec<LogEntry> {
        self.logs.lock().await.entries.clone()
    }
}

#[async_trait]
impl ActivityStore for MemoryActivityStore {
    async fn upsert_activity(
        &self,
        update: &ActivityUpdate,
        now: DateTime<Utc>,
    ) -> Result<PlayerActivityRecord, StoreError> {
        let mut records = self.records.write().await;
        let previous = records.get(&update.player_id).map(|r| r.last_update);
        let record = PlayerActivityRecord::from_snapshot(update.to_snapshot(), stamp(previous, now));
        records.insert(update.player_id.clone(), record.clone());
        Ok(record)
    }

    async fn get_activity(
        &self,
        player_id: &PlayerId,
    ) -> Result<Option<PlayerActivityRecord>, StoreError> {
        Ok(self.records.read().await.get(player_id).cloned())
    }

    async fn record_log_event(&self, entry: &LogEntry) -> Result<LogInsertOutcome, StoreError> {
        let mut logs = self.logs.lock().await;
        if !logs.seen.insert(entry.fingerprint()) {
            return Ok(LogInsertOutcome::Duplicate);
        }
        logs.entries.push(entry.clone());
        Ok(LogInsertOutcome::Stored)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
