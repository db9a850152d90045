//! Wire request from clients and the provider payload built from it.

use serde::{Deserialize, Serialize};

use super::provider::{Provider, DEFAULT_MODEL};
use crate::models::{ChatMessage, Role};

/// Model that takes no system role; its system text is folded into the
/// first user turn.
const SYSTEM_FOLDING_MODEL: &str = "Baichuan-M2-Plus";

/// Body of a chat request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_search: Option<bool>,
}

impl ChatRequest {
    /// Requested model, or the default when none or blank.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn wants_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebSearch {
    pub enable: bool,
    pub search_mode: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub web_search: WebSearch,
}

/// Body sent to the provider's chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

/// Fold system messages into the first user turn for models that reject
/// the system role. Other models get the messages unchanged.
pub fn normalize_messages(model: &str, messages: &[ChatMessage]) -> Vec<ChatMessage> {
    if model != SYSTEM_FOLDING_MODEL {
        return messages.to_vec();
    }

    let system = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let mut turns: Vec<ChatMessage> = messages
        .iter()
        .filter(|m| matches!(m.role, Role::User | Role::Assistant))
        .cloned()
        .collect();

    if !system.is_empty() {
        match turns.iter_mut().find(|m| m.role == Role::User) {
            Some(first_user) => {
                first_user.content = format!("{system}\n\n{}", first_user.content);
            }
            None => turns.insert(0, ChatMessage::user(system)),
        }
    }
    turns
}

/// Provider payload with provider defaults filled in.
pub fn build_payload(provider: Provider, request: &ChatRequest) -> UpstreamPayload {
    let model = request.model().to_string();
    let messages = normalize_messages(&model, &request.messages);
    let stream = request.wants_stream();
    let top_p = request.top_p.unwrap_or(0.85);
    let max_tokens = request.max_tokens.unwrap_or(1024);

    let mut payload = match provider {
        Provider::DeepSeek => UpstreamPayload {
            model,
            messages,
            stream,
            temperature: request.temperature.unwrap_or(0.2),
            top_p,
            top_k: None,
            max_tokens,
            tools: None,
        },
        Provider::Baichuan => UpstreamPayload {
            model,
            messages,
            stream,
            temperature: request.temperature.unwrap_or(0.3),
            top_p,
            top_k: Some(request.top_k.unwrap_or(5)),
            max_tokens,
            tools: None,
        },
    };

    if request.enable_search.unwrap_or(false)
        && provider == Provider::Baichuan
        && payload.model != SYSTEM_FOLDING_MODEL
    {
        payload.tools = Some(vec![Tool {
            kind: "web_search",
            web_search: WebSearch {
                enable: true,
                search_mode: "quality_first",
            },
        }]);
    }
    payload
}
