//! Chat completion endpoint.
//!
//! `POST /api/chat` forwards the request through the gateway. Streamed
//! requests are relayed byte-for-byte as `text/event-stream`; everything
//! else returns the upstream JSON.

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::upstream::{ChatReply, ChatRequest, ChatTransport};

/// `POST /api/chat`: relay a chat request upstream.
pub async fn complete(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    if req.messages.is_empty() {
        return Err(ApiError::BadRequest("messages must not be empty".into()));
    }

    let request_id = Uuid::new_v4();
    tracing::debug!(%request_id, model = %req.model(), stream = req.wants_stream(), "Chat request");

    match ctx.gateway.send(req).await {
        Ok(ChatReply::Completion(body)) => Ok(Json(body).into_response()),
        Ok(ChatReply::EventStream(stream)) => {
            tracing::debug!(%request_id, "Relaying event stream");
            Ok((
                [
                    (header::CONTENT_TYPE, "text/event-stream"),
                    (header::CACHE_CONTROL, "no-cache"),
                    (header::CONNECTION, "keep-alive"),
                ],
                Body::from_stream(stream),
            )
                .into_response())
        }
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "Chat request failed");
            Err(e.into())
        }
    }
}
