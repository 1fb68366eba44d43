//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps backend errors from entities-core to HTTP status codes.
//!
//! Bodies carry a machine-readable code and a generic message only. Binding
//! failures are logged at `debug`; internal faults are logged at `error` and
//! never returned to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use entities_core::EntityError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST", "NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request could not be bound: absent or malformed body, bad query
    /// string, or an unusable identifier (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body exceeds the configured size limit (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The `{version}` route segment is malformed or not supported (400).
    #[error("unsupported API version: {0}")]
    UnsupportedApiVersion(String),

    /// No entity matched the given identifier (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The patch document could not be applied (422).
    #[error("unprocessable entity: {0}")]
    Unprocessable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::UnsupportedApiVersion(_) => (StatusCode::BAD_REQUEST, "UNSUPPORTED_API_VERSION"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_ENTITY"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Generic client-facing message. Never includes the variant's payload.
    fn public_message(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "It was not possible to bind the request",
            Self::PayloadTooLarge(_) => "The request body is too large",
            Self::UnsupportedApiVersion(_) => "The requested API version is not supported",
            Self::NotFound(_) => "No entity matched the given identifier",
            Self::Unprocessable(_) => "Unable to process the contained instructions",
            Self::Internal(_) => "An internal error occurred",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::NotFound(_) | Self::Unprocessable(_) => tracing::info!(error = %self),
            Self::BadRequest(_) | Self::PayloadTooLarge(_) | Self::UnsupportedApiVersion(_) => {
                tracing::debug!(error = %self, "request rejected")
            }
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.public_message().to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert backend errors to API errors.
impl From<EntityError> for AppError {
    fn from(err: EntityError) -> Self {
        match &err {
            EntityError::NotFound(_) => Self::NotFound(err.to_string()),
            EntityError::Unprocessable { .. } => Self::Unprocessable(err.to_string()),
            // The controller rejects nil ids before delegating, so a backend
            // seeing one is a server-side defect.
            EntityError::MissingId | EntityError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}
