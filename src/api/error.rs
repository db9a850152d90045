//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::metadata::MetadataError;
use crate::upstream::UpstreamError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("API key not set for model {model}")]
    ConfigMissing { model: String },
    #[error("Upstream rejected request (HTTP {status})")]
    UpstreamRejected { status: u16, body: String },
    #[error("Upstream unavailable")]
    UpstreamUnavailable,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::ConfigMissing { model } => {
                tracing::error!(model = %model, "Chat request without configured API key");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_MISSING",
                    "API key not set".to_string(),
                )
            }
            ApiError::UpstreamRejected { status, body } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_REJECTED",
                if body.trim().is_empty() {
                    "Upstream error".to_string()
                } else {
                    body.clone()
                },
            ),
            ApiError::UpstreamUnavailable => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAVAILABLE",
                "Upstream unavailable".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingCredential { model } => ApiError::ConfigMissing { model },
            UpstreamError::Rejected { status, body } => ApiError::UpstreamRejected { status, body },
            UpstreamError::Unavailable { .. } => ApiError::UpstreamUnavailable,
            UpstreamError::Transport(e) | UpstreamError::InvalidResponse(e) => ApiError::Internal(e),
        }
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::InvalidUrl(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
