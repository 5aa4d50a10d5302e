use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use common::{ActivityUpdate, MAX_NAME_LEN, PlayerId, StatusResponse};
use serde_json::Value as JsonValue;
use tracing::debug;

use super::error::ApiError;
use crate::http_server::AppState;

/// Checks a raw request body and turns it into an update.
///
/// `player_id` is checked on its own first so a missing or malformed id gets
/// its own reason; the remaining fields are then type-checked together.
pub fn parse_update(body: JsonValue) -> Result<ActivityUpdate, ApiError> {
    let Some(fields) = body.as_object() else {
        return Err(ApiError::Validation(
            "invalid payload: expected a JSON object".to_string(),
        ));
    };

    match fields.get("player_id") {
        None | Some(JsonValue::Null) => {
            return Err(ApiError::Validation("missing player_id".to_string()));
        }
        Some(raw) => {
            PlayerId::try_from(raw)
                .map_err(|e| ApiError::Validation(format!("invalid player_id: {}", e)))?;
        }
    }

    let update: ActivityUpdate = serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("invalid payload: {}", e)))?;

    if let Some(name) = &update.name {
        if name.len() > MAX_NAME_LEN {
            return Err(ApiError::Validation(format!(
                "invalid payload: name exceeds {} bytes",
                MAX_NAME_LEN
            )));
        }
    }
    if let Some(position) = &update.position {
        if !position.is_finite() {
            return Err(ApiError::Validation(
                "invalid payload: position must be finite".to_string(),
            ));
        }
    }

    Ok(update)
}

/// `POST /update_activity`
pub async fn update_activity(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(body) =
        payload.map_err(|e| ApiError::Validation(format!("invalid payload: {}", e.body_text())))?;
    let update = parse_update(body)?;

    let record = state.store.upsert_activity(&update, Utc::now()).await?;
    debug!(
        "Activity for player {}: state={} online={} at {}",
        record.player_id,
        record.state.as_str(),
        record.online,
        record.last_update
    );

    Ok(Json(StatusResponse::ok()))
}
