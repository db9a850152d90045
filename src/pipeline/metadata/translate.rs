//! Title translation through the chat gateway.

use std::sync::Arc;

use super::resolver::TitleTranslator;
use crate::models::ChatMessage;
use crate::pipeline::stream::pick_completion_content;
use crate::upstream::{ChatReply, ChatRequest, ChatTransport, DEFAULT_MODEL};

const TRANSLATOR_SYSTEM_PROMPT: &str =
    "You are a translator. Output only the translated title without explanations.";

/// Translates titles with a short, low-temperature completion.
///
/// Returns `None` without calling upstream when no credential is
/// configured for the translation model.
pub struct LlmTitleTranslator<C> {
    transport: Arc<C>,
}

impl<C> LlmTitleTranslator<C> {
    pub fn new(transport: Arc<C>) -> Self {
        Self { transport }
    }
}

fn translation_request(title: &str, target_lang: &str) -> ChatRequest {
    ChatRequest {
        model: Some(DEFAULT_MODEL.to_string()),
        messages: vec![
            ChatMessage::system(TRANSLATOR_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Translate the following title into {target_lang}: \n\n{title}"
            )),
        ],
        stream: Some(false),
        temperature: Some(0.1),
        top_p: Some(0.8),
        top_k: Some(5),
        max_tokens: Some(128),
        enable_search: None,
    }
}

impl<C: ChatTransport> TitleTranslator for LlmTitleTranslator<C> {
    async fn translate(&self, title: &str, target_lang: &str) -> Option<String> {
        if !self.transport.has_credential(DEFAULT_MODEL) {
            return None;
        }
        match self.transport.send(translation_request(title, target_lang)).await {
            Ok(ChatReply::Completion(body)) => pick_completion_content(&body),
            Ok(ChatReply::EventStream(_)) => None,
            Err(e) => {
                tracing::warn!(target_lang = %target_lang, error = %e, "Title translation failed");
                None
            }
        }
    }
}
