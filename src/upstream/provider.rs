//! Provider selection by model name, endpoints and credentials.

use serde::Serialize;

/// Model used when a request names none.
pub const DEFAULT_MODEL: &str = "Baichuan-M2-Plus";

/// Models offered to clients.
pub const KNOWN_MODELS: &[&str] = &[
    "Baichuan4-Turbo",
    "Baichuan4-Air",
    "Baichuan4",
    "Baichuan3-Turbo",
    "Baichuan3-Turbo-128k",
    "Baichuan2-Turbo",
    "Baichuan-M2-Plus",
    "Baichuan-M2",
];

pub const BAICHUAN_ENDPOINT: &str = "https://api.baichuan-ai.com/v1/chat/completions";
pub const DEEPSEEK_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";

/// Upstream chat-completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Baichuan,
    DeepSeek,
}

impl Provider {
    /// `Baichuan*` (case-sensitive) or `deepseek*` (any case).
    pub fn for_model(model: &str) -> Option<Self> {
        if model.starts_with("Baichuan") {
            Some(Self::Baichuan)
        } else if model.to_lowercase().starts_with("deepseek") {
            Some(Self::DeepSeek)
        } else {
            None
        }
    }

    pub fn key_env(self) -> &'static str {
        match self {
            Self::Baichuan => "BAICHUAN_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }
}

/// Endpoints and API keys for every provider.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub baichuan_endpoint: String,
    pub deepseek_endpoint: String,
    pub baichuan_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            baichuan_endpoint: BAICHUAN_ENDPOINT.to_string(),
            deepseek_endpoint: DEEPSEEK_ENDPOINT.to_string(),
            baichuan_api_key: None,
            deepseek_api_key: None,
        }
    }
}

impl UpstreamConfig {
    pub fn endpoint(&self, provider: Provider) -> &str {
        match provider {
            Provider::Baichuan => &self.baichuan_endpoint,
            Provider::DeepSeek => &self.deepseek_endpoint,
        }
    }

    /// Non-blank API key for a provider.
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Baichuan => self.baichuan_api_key.as_deref(),
            Provider::DeepSeek => self.deepseek_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    /// Key for whichever provider serves `model`.
    pub fn api_key_for_model(&self, model: &str) -> Option<&str> {
        Provider::for_model(model).and_then(|p| self.api_key(p))
    }
}
