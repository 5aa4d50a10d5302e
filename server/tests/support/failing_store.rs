use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ActivityUpdate, PlayerId};
use server::db::{ActivityStore, LogEntry, LogInsertOutcome, PlayerActivityRecord, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store whose every call fails, counting how often it was touched
pub struct FailingStore {
    unavailable: bool,
    calls: AtomicUsize,
}

impl FailingStore {
    /// Fails like a store that cannot be reached
    pub fn unavailable() -> Self {
        Self { unavailable: true, calls: AtomicUsize::new(0) }
    }

    /// Fails like a store that answered with an error
    pub fn broken() -> Self {
        Self { unavailable: false, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            StoreError::Unavailable("connection refused".to_string())
        } else {
            StoreError::Backend("WRONGTYPE Operation against a key".to_string())
        }
    }
}

#[async_trait]
impl ActivityStore for FailingStore {
    async fn upsert_activity(
        &self,
        _update: &ActivityUpdate,
        _now: DateTime<Utc>,
    ) -> Result<PlayerActivityRecord, StoreError> {
        Err(self.fail())
    }

    async fn get_activity(
        &self,
        _player_id: &PlayerId,
    ) -> Result<Option<PlayerActivityRecord>, StoreError> {
        Err(self.fail())
    }

    async fn record_log_event(&self, _entry: &LogEntry) -> Result<LogInsertOutcome, StoreError> {
        Err(self.fail())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(self.fail())
    }
}
