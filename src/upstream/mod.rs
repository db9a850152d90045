//! Upstream chat-completion access: provider selection, payload
//! construction, retry and SSE pass-through.

pub mod gateway;
pub mod payload;
pub mod provider;
pub mod retry;

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use serde_json::Value;
use thiserror::Error;

pub use gateway::{dev_mode_completion, ChatGateway, DEV_MODE_REPLY};
pub use payload::{build_payload, normalize_messages, ChatRequest, UpstreamPayload};
pub use provider::{Provider, UpstreamConfig, DEFAULT_MODEL, KNOWN_MODELS};
pub use retry::{AttemptOutcome, RetryPolicy};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("API key not set for model {model}")]
    MissingCredential { model: String },

    #[error("Upstream rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Upstream unavailable after {attempts} attempts")]
    Unavailable { attempts: u32 },

    #[error("Upstream transport error: {0}")]
    Transport(String),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

/// Raw SSE bytes from the provider.
pub type ByteStream = BoxStream<'static, Result<Bytes, UpstreamError>>;

/// What a chat request produced.
pub enum ChatReply {
    /// Parsed non-streamed completion body.
    Completion(Value),
    /// Event stream to be relayed or consumed.
    EventStream(ByteStream),
}

impl fmt::Debug for ChatReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completion(body) => f.debug_tuple("Completion").field(body).finish(),
            Self::EventStream(_) => f.write_str("EventStream(..)"),
        }
    }
}

/// Sends chat requests to an upstream provider.
pub trait ChatTransport: Send + Sync {
    /// Whether a credential is configured for the provider serving `model`.
    fn has_credential(&self, model: &str) -> bool;

    fn send(&self, request: ChatRequest)
        -> impl Future<Output = Result<ChatReply, UpstreamError>> + Send;
}
