use common::PlayerId;

pub struct RedisKeys;

impl RedisKeys {
    // === Activity Keys ===

    /// Hash holding the latest snapshot of one player (`doc` + `updated_ms`)
    pub fn player_activity(player_id: &PlayerId) -> String {
        format!("activity:player:{}", player_id)
    }

    // === Log Relay Keys ===

    /// List of relayed log entries, oldest first
    pub fn log_events() -> String {
        "activity:logs".to_string()
    }

    /// Marker set once a log entry with this fingerprint has been stored
    pub fn log_seen(fingerprint: &str) -> String {
        format!("activity:log:seen:{}", fingerprint)
    }
}
