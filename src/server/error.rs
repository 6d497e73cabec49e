//! HTTP error mapping
//!
//! Every failure leaves the API as `{"detail": "..."}` with one of three
//! statuses: 422 for request shape problems, 404 for unknown ids and 500 for
//! everything else.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing request fields, rejected before storage is touched
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::NotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Internal(reason) => {
                tracing::error!("Request failed: {}", reason);
                // Storage details stay in the server log
                "Internal Server Error".to_string()
            }
            ApiError::Validation(reason) => {
                tracing::debug!("Rejected request: {}", reason);
                reason
            }
            ApiError::NotFound(reason) => reason,
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
