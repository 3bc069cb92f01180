//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type. Pipeline stages return it
//! so each failure can be logged with its cause; the REST layer turns it
//! into a structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::recognition::RecognitionError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "allow-list entry not found: 7"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status                  |
/// |-----------|-----------------------|------------------------------|
/// | 1000–1999 | Validation / decoding | 400 Bad Request              |
/// | 2000–2999 | Not found / conflict  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server / storage      | 500 Internal Server Error    |
/// | 5000–5999 | Recognition upstream  | 502 Bad Gateway              |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Submitted image body is not valid base64.
    #[error("image decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Allow-list entry with the given ID was not found.
    #[error("allow-list entry not found: {0}")]
    EntryNotFound(i64),

    /// Decision record with the given ID was not found.
    #[error("decision record not found: {0}")]
    DecisionNotFound(i64),

    /// An allow-list entry with this identifier already exists.
    #[error("identifier already on the allow-list: {0}")]
    DuplicateIdentifier(String),

    /// Artifact could not be written or read.
    #[error("artifact storage error: {0}")]
    ArtifactStorage(String),

    /// The external recognition service failed.
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Decode(_) => 1002,
            Self::EntryNotFound(_) => 2001,
            Self::DecisionNotFound(_) => 2002,
            Self::DuplicateIdentifier(_) => 2003,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::ArtifactStorage(_) => 3002,
            Self::Recognition(RecognitionError::Transport(_)) => 5001,
            Self::Recognition(RecognitionError::MalformedResponse(_)) => 5002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::EntryNotFound(_) | Self::DecisionNotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateIdentifier(_) => StatusCode::CONFLICT,
            Self::ArtifactStorage(_) | Self::PersistenceError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Recognition(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::ArtifactStorage(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
