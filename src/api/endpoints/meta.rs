//! Citation metadata endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::metadata::{MetadataRequest, MetadataResponse};

/// `POST /api/meta`: title, DOI and translated title for a URL.
///
/// Unreachable pages still answer 200 with the fields left empty.
pub async fn lookup(
    State(ctx): State<ApiContext>,
    Json(req): Json<MetadataRequest>,
) -> Result<Json<MetadataResponse>, ApiError> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("url is required".into()));
    }
    let meta = ctx.resolver.resolve(url, req.target_lang.as_deref()).await?;
    Ok(Json(meta))
}
