use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// Upper bound on a display name in bytes.
pub const MAX_NAME_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MovementState {
    #[default]
    Idle,
    Walking,
    Jumping,
    Falling,
}

impl MovementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementState::Idle => "idle",
            MovementState::Walking => "walking",
            MovementState::Jumping => "jumping",
            MovementState::Falling => "falling",
        }
    }
}

/// Body of `POST /update_activity`.
///
/// Everything except `player_id` is optional. A missing field is not merged
/// from the previously stored record; the stored snapshot takes the field's
/// default instead (see [`ActivitySnapshot`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityUpdate {
    pub player_id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<MovementState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
}

impl ActivityUpdate {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            name: None,
            position: None,
            state: None,
            online: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_state(mut self, state: MovementState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_online(mut self, online: bool) -> Self {
        self.online = Some(online);
        self
    }

    /// The snapshot this update stores, with absent fields defaulted.
    pub fn to_snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot {
            player_id: self.player_id.clone(),
            name: self.name.clone(),
            position: self.position,
            state: self.state.unwrap_or_default(),
            online: self.online.unwrap_or(false),
        }
    }
}

/// Player state as persisted, minus the server-assigned timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub player_id: PlayerId,
    pub name: Option<String>,
    pub position: Option<Position>,
    pub state: MovementState,
    pub online: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_update_parses() {
        let update: ActivityUpdate =
            serde_json::from_value(json!({"player_id": "42", "online": true})).unwrap();
        assert_eq!(update.player_id.as_str(), "42");
        assert_eq!(update.online, Some(true));
        assert_eq!(update.state, None);
    }

    #[test]
    fn test_full_update_parses() {
        let update: ActivityUpdate = serde_json::from_value(json!({
            "player_id": 7,
            "name": "Alice",
            "position": {"x": 1.0, "y": 2.5, "z": -3},
            "state": "jumping",
            "online": true
        }))
        .unwrap();
        assert_eq!(update.name.as_deref(), Some("Alice"));
        assert_eq!(update.position, Some(Position::new(1.0, 2.5, -3.0)));
        assert_eq!(update.state, Some(MovementState::Jumping));
    }

    #[test]
    fn test_unknown_state_rejected() {
        let result = serde_json::from_value::<ActivityUpdate>(json!({
            "player_id": "1",
            "state": "swimming"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_defaults_absent_fields() {
        let snapshot = ActivityUpdate::new(PlayerId::from(9u64)).to_snapshot();
        assert_eq!(snapshot.name, None);
        assert_eq!(snapshot.position, None);
        assert_eq!(snapshot.state, MovementState::Idle);
        assert!(!snapshot.online);
    }

    #[test]
    fn test_absent_fields_not_serialized() {
        let update = ActivityUpdate::new(PlayerId::from(5u64)).with_online(false);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"player_id": "5", "online": false})
        );
    }
}
