//! Health check endpoint.

use axum::Json;
use serde::Serialize;

use crate::upstream::KNOWN_MODELS;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub models: &'static [&'static str],
}

/// `GET /api/health`: liveness and version.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        models: KNOWN_MODELS,
    })
}
