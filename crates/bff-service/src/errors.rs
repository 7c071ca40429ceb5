//! Pricing BFF error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse`
//! impl. Authentication rejections (401) carry a cause string that is safe
//! to display; infrastructure failures (500-class) return a generic message
//! while the actual error is logged server-side. The two are never
//! conflated: "you are not who you claim" is 401, "we failed to check who
//! you are" is 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Pricing BFF error type.
///
/// Maps to HTTP status codes:
/// - Unauthenticated, UnauthorizedBusinessUnit: 401 Unauthorized
/// - BadRequest, UpstreamPricing, UpstreamBatch: 400 Bad Request
/// - Database, KeySetFetch, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum BffError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("User is not authorized for the requested business unit")]
    UnauthorizedBusinessUnit,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Cloud pricing API error: {message}")]
    UpstreamPricing {
        message: String,
        code: Option<i64>,
    },

    #[error("Batch API error: {0}")]
    UpstreamBatch(String),

    #[error("Key set fetch error: {0}")]
    KeySetFetch(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal,
}

impl BffError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            BffError::Unauthenticated(_) | BffError::UnauthorizedBusinessUnit => 401,
            BffError::BadRequest(_)
            | BffError::UpstreamPricing { .. }
            | BffError::UpstreamBatch(_) => 400,
            BffError::KeySetFetch(_) | BffError::Database(_) | BffError::Internal => 500,
        }
    }
}

/// Structured error body returned to the frontend.
#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    #[serde(rename = "errorCode")]
    error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<String>,
    message: String,
}

impl IntoResponse for BffError {
    fn into_response(self) -> Response {
        let (status, error_code, cause, message) = match self {
            BffError::Unauthenticated(cause) => (
                StatusCode::UNAUTHORIZED,
                "USER_UNAUTHORIZED",
                Some(cause),
                "User cannot be authenticated".to_string(),
            ),
            BffError::UnauthorizedBusinessUnit => (
                StatusCode::UNAUTHORIZED,
                "BUNIT_UNAUTHORIZED",
                Some("User authorization validations failed".to_string()),
                "User is not authorized to perform this action in the requested business unit"
                    .to_string(),
            ),
            BffError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", None, reason)
            }
            BffError::UpstreamPricing { message, code } => {
                tracing::warn!(
                    target: "bff.services.pricing",
                    upstream_code = ?code,
                    error = %message,
                    "Cloud pricing request failed"
                );
                (
                    StatusCode::BAD_REQUEST,
                    "PRICING_API_ERROR",
                    code.map(|c| format!("Upstream error code: {c}")),
                    format!("Failed to fetch data from cloud pricing endpoint, {message}"),
                )
            }
            BffError::UpstreamBatch(message) => {
                tracing::warn!(target: "bff.services.batch", error = %message, "Batch API request failed");
                (
                    StatusCode::BAD_REQUEST,
                    "BATCH_API_ERROR",
                    None,
                    format!("Error occurred while calling the batch file service, {message}"),
                )
            }
            BffError::KeySetFetch(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "bff.auth.jwks", error = %err, "Key set fetch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUTH_CHECK_FAILED",
                    None,
                    "Authorization interceptor failed".to_string(),
                )
            }
            BffError::Database(err) => {
                tracing::error!(target: "bff.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    None,
                    "An internal database error occurred".to_string(),
                )
            }
            BffError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                None,
                "An internal error occurred".to_string(),
            ),
        };

        let body = ErrorBody {
            status: "error",
            error_code,
            cause,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Convert sqlx errors to BffError
impl From<sqlx::Error> for BffError {
    fn from(err: sqlx::Error) -> Self {
        BffError::Database(err.to_string())
    }
}
