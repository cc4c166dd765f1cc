use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::errors::{ErrorKind, StoreError};

/// error surfaced to HTTP callers as `{ success: false, message }`
#[derive(Debug)]
pub enum ApiError {
    /// no usable caller identity
    Unauthorized(String),
    /// body or path could not be decoded
    BadRequest(String),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthorized(message) | ApiError::BadRequest(message) => message,
            ApiError::Store(err) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %err, "request failed");
                "internal server error".to_string()
            }
            ApiError::Store(err) => err.to_string(),
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
