use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;

/// Upper bound on the normalised id length in bytes.
pub const MAX_PLAYER_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerIdError {
    #[error("player_id must not be empty")]
    Empty,
    #[error("player_id exceeds {MAX_PLAYER_ID_LEN} bytes")]
    TooLong,
    #[error("player_id must be a non-negative integer")]
    NotAnInteger,
    #[error("player_id must be a string or an integer, got {0}")]
    WrongType(&'static str),
}

/// Identifier assigned to a player by the upstream game platform.
///
/// The wire accepts either a JSON string or a non-negative JSON integer.
/// Both forms normalise to the same key, so `42` and `"42"` address the same
/// record. Surrounding whitespace in string ids is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn parse(raw: &str) -> Result<Self, PlayerIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlayerIdError::Empty);
        }
        if trimmed.len() > MAX_PLAYER_ID_LEN {
            return Err(PlayerIdError::TooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&JsonValue> for PlayerId {
    type Error = PlayerIdError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::String(s) => PlayerId::parse(s),
            JsonValue::Number(n) => n
                .as_u64()
                .map(PlayerId::from)
                .ok_or(PlayerIdError::NotAnInteger),
            JsonValue::Null => Err(PlayerIdError::WrongType("null")),
            JsonValue::Bool(_) => Err(PlayerIdError::WrongType("boolean")),
            JsonValue::Array(_) => Err(PlayerIdError::WrongType("array")),
            JsonValue::Object(_) => Err(PlayerIdError::WrongType("object")),
        }
    }
}

impl Serialize for PlayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct PlayerIdVisitor;

impl<'de> Visitor<'de> for PlayerIdVisitor {
    type Value = PlayerId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-empty string or a non-negative integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<PlayerId, E> {
        PlayerId::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<PlayerId, E> {
        Ok(PlayerId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<PlayerId, E> {
        u64::try_from(v)
            .map(PlayerId::from)
            .map_err(|_| E::custom(PlayerIdError::NotAnInteger))
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<PlayerId, E> {
        Err(E::custom(PlayerIdError::NotAnInteger))
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PlayerIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_and_integer_ids_normalise_to_same_key() {
        let from_str: PlayerId = serde_json::from_value(json!("42")).unwrap();
        let from_int: PlayerId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(from_str, from_int);
        assert_eq!(from_str.as_str(), "42");
    }

    #[test]
    fn test_string_ids_are_trimmed() {
        let id = PlayerId::parse("  player-7 ").unwrap();
        assert_eq!(id.as_str(), "player-7");
    }

    #[test]
    fn test_malformed_ids_rejected() {
        assert_eq!(PlayerId::parse("   "), Err(PlayerIdError::Empty));
        assert_eq!(
            PlayerId::parse(&"x".repeat(MAX_PLAYER_ID_LEN + 1)),
            Err(PlayerIdError::TooLong)
        );
        assert_eq!(
            PlayerId::try_from(&json!(-3)),
            Err(PlayerIdError::NotAnInteger)
        );
        assert_eq!(
            PlayerId::try_from(&json!(1.5)),
            Err(PlayerIdError::NotAnInteger)
        );
        assert_eq!(
            PlayerId::try_from(&json!(true)),
            Err(PlayerIdError::WrongType("boolean"))
        );
        assert!(serde_json::from_value::<PlayerId>(json!(null)).is_err());
        assert!(serde_json::from_value::<PlayerId>(json!(-1)).is_err());
        assert!(serde_json::from_value::<PlayerId>(json!({"id": 1})).is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = PlayerId::from(1234567u64);
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("1234567"));
    }
}
