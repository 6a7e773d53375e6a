// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Non-2xx response from the Strava API, carrying status and body text.
    #[error("Strava API error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error means the Strava token is expired or revoked.
    ///
    /// Callers treat this as "session is no longer usable" and respond 401
    /// so the client restarts the OAuth flow.
    pub fn is_token_error(&self) -> bool {
        matches!(self, AppError::Upstream { status: 401, .. })
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidSession => (StatusCode::UNAUTHORIZED, "invalid_session", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Upstream { status: 401, .. } => {
                (StatusCode::UNAUTHORIZED, "strava_token_invalid", None)
            }
            AppError::Upstream { status, body } => (
                StatusCode::BAD_GATEWAY,
                "strava_error",
                Some(format!("HTTP {}: {}", status, body)),
            ),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
