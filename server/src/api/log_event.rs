use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use common::StatusResponse;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::error::ApiError;
use crate::db::{LogEntry, LogInsertOutcome};
use crate::http_server::AppState;

#[derive(Debug, Deserialize)]
pub struct LogEventRequest {
    pub log_type: Option<String>,
    pub log_data: Option<JsonValue>,
    pub timestamp: Option<JsonValue>,
}

impl LogEventRequest {
    pub fn into_entry(self) -> Result<LogEntry, ApiError> {
        let log_type = self
            .log_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("missing log_type or log_data".to_string()))?;

        let log_data = match self.log_data {
            Some(JsonValue::Object(map)) if !map.is_empty() => JsonValue::Object(map),
            _ => return Err(ApiError::Validation("missing log_type or log_data".to_string())),
        };

        Ok(LogEntry::new(log_type, log_data, self.timestamp))
    }
}

/// `POST /log_event`
pub async fn log_event(
    State(state): State<AppState>,
    payload: Result<Json<LogEventRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::Validation(format!("invalid payload: {}", e.body_text())))?;
    let entry = request.into_entry()?;

    match state.store.record_log_event(&entry).await? {
        LogInsertOutcome::Stored => {
            info!("Stored {} log for processing", entry.log_type);
            Ok(Json(StatusResponse::ok_with_message("log stored for processing")))
        }
        LogInsertOutcome::Duplicate => {
            debug!("Duplicate {} log ignored", entry.log_type);
            Ok(Json(StatusResponse::ok_with_message("duplicate log ignored")))
        }
    }
}
