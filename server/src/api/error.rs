use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::StatusResponse;
use thiserror::Error;
use tracing::{error, warn};

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller sent something we will not store. Never retried here.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Reason reported to the caller. Store internals stay in the logs.
    pub fn reason(&self) -> String {
        match self {
            ApiError::Validation(reason) => reason.clone(),
            ApiError::Store(e) if e.is_unavailable() => "store unavailable".to_string(),
            ApiError::Store(_) => "store error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Validation(reason) => warn!("Rejected request: {}", reason),
            ApiError::Store(e) => error!("Store failure: {}", e),
        }

        let body = Json(StatusResponse::error(self.reason()));
        (self.status_code(), body).into_response()
    }
}
