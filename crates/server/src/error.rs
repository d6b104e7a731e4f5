//! HTTP error mapping
//!
//! Core errors carry a kind; this is the only place that kind becomes a
//! status code.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use deck_core::{Error, ErrorKind};

/// Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Upstream | ErrorKind::PartialBatch | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::Validation(format!(
            "Invalid JSON: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self(Error::Validation(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self(Error::Validation(format!("Failed to read multipart: {err}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
