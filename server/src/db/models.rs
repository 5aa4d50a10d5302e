use chrono::{DateTime, Utc};
use common::{ActivitySnapshot, MovementState, PlayerId, Position};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use sha2::{Digest, Sha256};

/// Latest known state of one player. At most one exists per `player_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerActivityRecord {
    pub player_id: PlayerId,
    pub name: Option<String>,
    pub position: Option<Position>,
    pub state: MovementState,
    pub online: bool,
    pub last_update: DateTime<Utc>,
}

impl PlayerActivityRecord {
    pub fn from_snapshot(snapshot: ActivitySnapshot, last_update: DateTime<Utc>) -> Self {
        Self {
            player_id: snapshot.player_id,
            name: snapshot.name,
            position: snapshot.position,
            state: snapshot.state,
            online: snapshot.online,
            last_update,
        }
    }

    /// The record without its server-assigned timestamp.
    pub fn snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot {
            player_id: self.player_id.clone(),
            name: self.name.clone(),
            position: self.position,
            state: self.state,
            online: self.online,
        }
    }
}

/// A game log entry queued for an external consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub log_type: String,
    pub log_data: JsonValue,
    pub timestamp: Option<JsonValue>,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(log_type: String, log_data: JsonValue, timestamp: Option<JsonValue>) -> Self {
        Self {
            log_type,
            log_data,
            timestamp,
            processed: false,
            created_at: Utc::now(),
        }
    }

    /// Identity used for duplicate suppression: type, message, username and
    /// client timestamp. Any other `log_data` fields do not participate.
    ///
    /// Hex SHA-256 of the identity's compact JSON. Markers persist in the
    /// store, so the digest must not depend on the build.
    pub fn fingerprint(&self) -> String {
        let identity = json!([
            self.log_type,
            self.log_data.get("message"),
            self.log_data.get("username"),
            self.timestamp,
        ]);
        let mut hasher = Sha256::new();
        hasher.update(identity.to_string().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogInsertOutcome {
    Stored,
    Duplicate,
}
