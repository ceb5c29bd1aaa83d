//! HTTP error mapping
//!
//! Every failure leaves the API as `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cms_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials or insufficient permissions";
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// `public` is sent to the client, `detail` only to the log.
    #[error("Internal error: {detail}")]
    Internal { public: String, detail: String },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a domain failure, using `failure` as the client message for
    /// store errors.
    pub fn from_domain(err: DomainError, failure: &str) -> Self {
        match err {
            DomainError::ValidationError(msg) => ApiError::BadRequest(msg),
            DomainError::PageNotFound(_) => ApiError::NotFound("Page not found".into()),
            DomainError::MenuNotFound(_) => ApiError::NotFound("Menu not found".into()),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal {
                public: failure.to_string(),
                detail: other.to_string(),
            },
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::from_domain(err, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                msg
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                msg
            }
            ApiError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                msg
            }
            ApiError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                msg
            }
            ApiError::Internal { public, detail } => {
                tracing::error!("{}: {}", public, detail);
                public
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Attaches the client-facing failure message to a domain result.
pub trait ResultExt<T> {
    fn or_fail(self, failure: &str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for Result<T, DomainError> {
    fn or_fail(self, failure: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_domain(e, failure))
    }
}
