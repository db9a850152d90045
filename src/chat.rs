//! Client-side chat session.
//!
//! Owns the persisted [`ClientState`] and drives one send at a time:
//! - language detection and the automatic system prompt
//! - directive assembly ahead of the history
//! - streamed answer with non-streamed fallback, then local fallback
//! - concurrent citation metadata refresh for the latest answer
//! - audience-enforced plain text and missing-section report

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use thiserror::Error;

use crate::client_state::ClientState;
use crate::models::{detect_language, last_assistant, Audience, ChatMessage, Language, Role};
use crate::pipeline::citation::{
    build_views, extract_urls, filter_trusted, filter_views, CitationFilter, CitationView,
    TrustStatus, TrustedCitations,
};
use crate::pipeline::metadata::{MetadataResolver, MetadataResponse, PageFetcher, TitleTranslator};
use crate::pipeline::prompt_templates::{auto_system_prompt, directive_stack};
use crate::pipeline::stream::{pick_completion_content, StreamConsumer};
use crate::pipeline::structure::{
    compose_fallback, ensure_for_audience, format_plain, missing_sections,
};
use crate::upstream::{ChatReply, ChatRequest, ChatTransport};

/// Temperature ceiling in detailed mode.
const DETAILED_MAX_TEMPERATURE: f64 = 0.15;
/// Token floor in detailed mode.
const DETAILED_MIN_TOKENS: u32 = 1800;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Input is empty")]
    EmptyInput,
}

/// Where the answer text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Stream,
    Completion,
    LocalFallback,
}

/// Result of one send, ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReport {
    /// Raw assistant text as stored in the history.
    pub raw: String,
    /// Plain-formatted, audience-enforced text.
    pub text: String,
    pub source: AnswerSource,
    pub language: Language,
    pub missing_sections: Vec<&'static str>,
    pub citations: Vec<CitationView>,
    pub trust: TrustStatus,
}

/// An answer prepared for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAnswer {
    pub text: String,
    pub citations: Vec<CitationView>,
}

// ═══════════════════════════════════════════
// Session
// ═══════════════════════════════════════════

pub struct ChatSession<C, F, T> {
    transport: Arc<C>,
    resolver: Arc<MetadataResolver<F, T>>,
    consumer: StreamConsumer,
    state: ClientState,
    audience: Audience,
    detailed: bool,
    language: Language,
    query: String,
    metadata: HashMap<String, MetadataResponse>,
}

impl<C, F, T> ChatSession<C, F, T>
where
    C: ChatTransport,
    F: PageFetcher,
    T: TitleTranslator,
{
    pub fn new(
        transport: Arc<C>,
        resolver: Arc<MetadataResolver<F, T>>,
        state: ClientState,
    ) -> Self {
        Self {
            transport,
            resolver,
            consumer: StreamConsumer::default(),
            state,
            audience: Audience::default(),
            detailed: true,
            language: Language::default(),
            query: String::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = audience;
        self
    }

    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    pub fn with_consumer(mut self, consumer: StreamConsumer) -> Self {
        self.consumer = consumer;
        self
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ClientState {
        &mut self.state
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The most recent user input.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn metadata(&self) -> &HashMap<String, MetadataResponse> {
        &self.metadata
    }

    /// Drop the conversation and system prompt.
    pub fn reset(&mut self) {
        self.state.reset();
        self.metadata.clear();
        self.query.clear();
    }

    /// Send `input`, calling `on_delta` for each streamed fragment.
    pub async fn send<D>(&mut self, input: &str, on_delta: D) -> Result<AnswerReport, SessionError>
    where
        D: FnMut(&str),
    {
        let input = input.trim();
        if input.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.language = detect_language(input);
        self.query = input.to_string();
        if self.state.system.trim().is_empty() {
            self.state.system = auto_system_prompt(self.language, input);
        }

        let request = self.build_request(input);
        self.state.messages.push(ChatMessage::user(input));

        tracing::info!(
            model = %request.model(),
            language = %self.language,
            audience = %self.audience,
            stream = request.wants_stream(),
            "Sending chat request"
        );

        let (raw, source) = if request.wants_stream() {
            self.state.messages.push(ChatMessage::assistant(""));
            let (raw, source) = self.answer_streamed(request, on_delta).await;
            if source != AnswerSource::Stream {
                if let Some(last) = self.state.messages.last_mut() {
                    last.content = raw.clone();
                }
            }
            (raw, source)
        } else {
            let (raw, source) = self.answer_once(request).await;
            self.state.messages.push(ChatMessage::assistant(raw.clone()));
            (raw, source)
        };

        self.refresh_citations().await;
        Ok(self.report(raw, source))
    }

    /// Request for `input`: directives, history, then the new user turn.
    pub fn build_request(&self, input: &str) -> ChatRequest {
        let mut messages: Vec<ChatMessage> = directive_stack(
            &self.state.system,
            self.language,
            self.audience,
            self.state.show_citations,
        )
        .into_iter()
        .map(ChatMessage::system)
        .collect();
        messages.extend(self.state.messages.iter().cloned());
        messages.push(ChatMessage::user(input));

        let (temperature, max_tokens) = if self.detailed {
            (
                self.state.temperature.min(DETAILED_MAX_TEMPERATURE),
                self.state.max_tokens.max(DETAILED_MIN_TOKENS),
            )
        } else {
            (self.state.temperature, self.state.max_tokens)
        };

        ChatRequest {
            messages,
            model: Some(self.state.model.clone()),
            temperature: Some(temperature),
            top_p: Some(self.state.top_p),
            top_k: Some(self.state.top_k),
            max_tokens: Some(max_tokens),
            stream: Some(self.state.stream),
            enable_search: Some(self.state.enable_search),
        }
    }

    /// Stream into the trailing assistant message, growing it with each
    /// delta as it arrives.
    async fn answer_streamed<D>(
        &mut self,
        request: ChatRequest,
        mut on_delta: D,
    ) -> (String, AnswerSource)
    where
        D: FnMut(&str),
    {
        let fallback_request = ChatRequest {
            stream: Some(false),
            ..request.clone()
        };

        match self.transport.send(request).await {
            Ok(ChatReply::EventStream(stream)) => {
                let messages = &mut self.state.messages;
                let outcome = self
                    .consumer
                    .consume(stream, |delta| {
                        if let Some(last) = messages.last_mut() {
                            last.content.push_str(delta);
                        }
                        on_delta(delta);
                    })
                    .await;
                if outcome.received() {
                    return (outcome.text, AnswerSource::Stream);
                }
                tracing::info!(end = ?outcome.end, "No stream deltas; retrying without streaming");
            }
            Ok(ChatReply::Completion(body)) => {
                if let Some(content) = pick_completion_content(&body) {
                    return (content, AnswerSource::Completion);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Streamed chat request failed");
            }
        }
        self.answer_once(fallback_request).await
    }

    async fn answer_once(&self, request: ChatRequest) -> (String, AnswerSource) {
        let content = match self.transport.send(request).await {
            Ok(ChatReply::Completion(body)) => pick_completion_content(&body),
            Ok(ChatReply::EventStream(stream)) => {
                let outcome = self.consumer.consume(stream, |_| {}).await;
                outcome.received().then_some(outcome.text)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                None
            }
        };

        match content {
            Some(text) => (text, AnswerSource::Completion),
            None => {
                tracing::info!(language = %self.language, "Using local fallback answer");
                (
                    compose_fallback(&self.query, self.language, self.audience),
                    AnswerSource::LocalFallback,
                )
            }
        }
    }

    /// Trusted citations of the latest assistant answer.
    pub fn citations(&self) -> TrustedCitations {
        let urls = last_assistant(&self.state.messages)
            .map(|m| extract_urls(&m.content))
            .unwrap_or_default();
        filter_trusted(&urls, &self.query)
    }

    /// Numbered citation views of the latest answer, optionally filtered.
    pub fn citation_views(&self, filter: &CitationFilter) -> Vec<CitationView> {
        let trusted = self.citations();
        filter_views(build_views(&trusted.urls, &self.metadata), filter)
    }

    /// Resolve metadata for citations not yet known, concurrently.
    ///
    /// Results are applied per URL as they complete; failures leave the
    /// URL unresolved so a later refresh retries it.
    pub async fn refresh_citations(&mut self) {
        let pending: Vec<String> = self
            .citations()
            .urls
            .into_iter()
            .filter(|u| !self.metadata.contains_key(u))
            .collect();
        if pending.is_empty() {
            return;
        }

        let lang = self.language.as_str();
        let resolver = Arc::clone(&self.resolver);
        let mut lookups: FuturesUnordered<_> = pending
            .iter()
            .map(|url| {
                let resolver = Arc::clone(&resolver);
                async move { (url.clone(), resolver.resolve(url, Some(lang)).await) }
            })
            .collect();

        while let Some((url, result)) = lookups.next().await {
            match result {
                Ok(meta) => {
                    self.metadata.insert(url, meta);
                }
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Citation metadata unavailable");
                }
            }
        }
    }

    /// Plain-formatted, audience-enforced rendering of `raw`.
    pub fn enforced_text(&self, raw: &str) -> String {
        ensure_for_audience(&format_plain(raw), &self.query, self.language, self.audience)
    }

    /// Enforced text and numbered citations of one assistant answer.
    pub fn rendered_answer(&self, message: &ChatMessage) -> RenderedAnswer {
        let trusted = filter_trusted(&extract_urls(&message.content), &self.query);
        RenderedAnswer {
            text: self.enforced_text(&message.content),
            citations: build_views(&trusted.urls, &self.metadata),
        }
    }

    /// The latest assistant answer, rendered.
    pub fn latest_answer(&self) -> Option<RenderedAnswer> {
        last_assistant(&self.state.messages).map(|m| self.rendered_answer(m))
    }

    /// Every assistant answer in order, rendered.
    pub fn all_answers(&self) -> Vec<RenderedAnswer> {
        self.state
            .messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| self.rendered_answer(m))
            .collect()
    }

    fn report(&self, raw: String, source: AnswerSource) -> AnswerReport {
        let text = self.enforced_text(&raw);
        let missing = missing_sections(&text, self.language, self.audience);
        if !missing.is_empty() {
            tracing::info!(missing = ?missing, "Answer is missing sections");
        }
        let trusted = self.citations();
        AnswerReport {
            citations: build_views(&trusted.urls, &self.metadata),
            trust: trusted.status,
            missing_sections: missing,
            language: self.language,
            source,
            text,
            raw,
        }
    }
}
