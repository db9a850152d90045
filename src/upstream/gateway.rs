//! Server side of the chat endpoint: credential check, payload build,
//! retried POST to the provider, and stream pass-through.

use std::time::Duration;

use futures_util::{StreamExt, TryStreamExt};
use serde_json::{json, Value};

use super::payload::{build_payload, UpstreamPayload};
use super::provider::{Provider, UpstreamConfig};
use super::retry::{AttemptOutcome, RetryPolicy};
use super::{ChatReply, ChatRequest, ChatTransport, UpstreamError};
use crate::config::{Environment, UPSTREAM_CONNECT_TIMEOUT_SECS};

/// Reply served outside production when no credential is configured.
pub const DEV_MODE_REPLY: &str =
    "開発モード: APIキー未設定のため簡易応答を返します。質問内容に合わせて参照を付けてください。";

/// Canned completion body wrapping [`DEV_MODE_REPLY`].
pub fn dev_mode_completion() -> Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": DEV_MODE_REPLY } }
        ]
    })
}

/// reqwest-backed gateway to Baichuan and DeepSeek.
#[derive(Clone)]
pub struct ChatGateway {
    client: reqwest::Client,
    upstream: UpstreamConfig,
    environment: Environment,
    retry: RetryPolicy,
}

impl ChatGateway {
    pub fn new(upstream: UpstreamConfig, environment: Environment) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(UPSTREAM_CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            upstream,
            environment,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    async fn attempt(
        &self,
        endpoint: &str,
        api_key: &str,
        payload: &UpstreamPayload,
    ) -> AttemptOutcome<reqwest::Response> {
        let response = match self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Retryable(e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            AttemptOutcome::Success(response)
        } else if status.is_server_error() {
            AttemptOutcome::Retryable(format!("HTTP {}", status.as_u16()))
        } else {
            let body = response.text().await.unwrap_or_default();
            AttemptOutcome::Fatal(UpstreamError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl ChatTransport for ChatGateway {
    fn has_credential(&self, model: &str) -> bool {
        self.upstream.api_key_for_model(model).is_some()
    }

    async fn send(&self, request: ChatRequest) -> Result<ChatReply, UpstreamError> {
        let model = request.model().to_string();
        let provider = Provider::for_model(&model);
        let credential = provider.and_then(|p| self.upstream.api_key(p).map(|k| (p, k)));

        let Some((provider, api_key)) = credential else {
            if self.environment.is_production() {
                tracing::error!(model = %model, "No API key configured");
                return Err(UpstreamError::MissingCredential { model });
            }
            tracing::info!(model = %model, "No API key configured; serving development reply");
            return Ok(ChatReply::Completion(dev_mode_completion()));
        };

        let payload = build_payload(provider, &request);
        let endpoint = self.upstream.endpoint(provider);
        tracing::info!(
            model = %payload.model,
            provider = ?provider,
            stream = payload.stream,
            messages = payload.messages.len(),
            "Forwarding chat request"
        );

        let payload_ref = &payload;
        let response = self
            .retry
            .run(move |_| self.attempt(endpoint, api_key, payload_ref))
            .await?;

        if payload.stream {
            let stream = response
                .bytes_stream()
                .map_err(|e| UpstreamError::Transport(e.to_string()))
                .boxed();
            Ok(ChatReply::EventStream(stream))
        } else {
            let body = response
                .json::<Value>()
                .await
                .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;
            Ok(ChatReply::Completion(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;
    use crate::pipeline::stream::StreamConsumer;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer, environment: Environment) -> ChatGateway {
        let upstream = UpstreamConfig {
            baichuan_endpoint: format!("{}/baichuan", server.uri()),
            deepseek_endpoint: format!("{}/deepseek", server.uri()),
            baichuan_api_key: Some("bc-test".into()),
            deepseek_api_key: None,
        };
        ChatGateway::new(upstream, environment)
    }

    fn request(model: &str, stream: bool) -> ChatRequest {
        ChatRequest {
            model: Some(model.into()),
            messages: vec![ChatMessage::user("高血圧の治療は？")],
            stream: Some(stream),
            ..Default::default()
        }
    }

    fn completion_body(reply: ChatReply) -> Value {
        match reply {
            ChatReply::Completion(body) => body,
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn development_without_key_serves_canned_reply() {
        let server = MockServer::start().await;
        let gw = gateway(&server, Environment::Development);

        let body = completion_body(gw.send(request("deepseek-chat", true)).await.unwrap());
        assert_eq!(body["choices"][0]["message"]["content"], DEV_MODE_REPLY);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn production_without_key_is_an_error() {
        let server = MockServer::start().await;
        let gw = gateway(&server, Environment::Production);
        let err = gw.send(request("deepseek-chat", false)).await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::MissingCredential {
                model: "deepseek-chat".into()
            }
        );
        let err = gw.send(request("gpt-4o", false)).await.unwrap_err();
        assert!(matches!(err, UpstreamError::MissingCredential { .. }));
    }

    #[tokio::test]
    async fn completion_is_forwarded_with_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/baichuan"))
            .and(header("authorization", "Bearer bc-test"))
            .and(body_partial_json(json!({
                "model": "Baichuan4-Turbo",
                "stream": false,
                "top_k": 5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "回答"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server, Environment::Production);
        let body = completion_body(gw.send(request("Baichuan4-Turbo", false)).await.unwrap());
        assert_eq!(body["choices"][0]["message"]["content"], "回答");
    }

    #[tokio::test]
    async fn stream_is_passed_through() {
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/baichuan"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let gw = gateway(&server, Environment::Production);
        let ChatReply::EventStream(stream) = gw.send(request("Baichuan-M2-Plus", true)).await.unwrap()
        else {
            panic!("expected event stream");
        };
        let outcome = StreamConsumer::default().consume(stream, |_| {}).await;
        assert_eq!(outcome.text, "AB");
    }

    #[tokio::test]
    async fn server_errors_exhaust_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let gw = gateway(&server, Environment::Production);
        let err = gw.send(request("Baichuan-M2-Plus", false)).await.unwrap_err();
        assert_eq!(err, UpstreamError::Unavailable { attempts: 3 });
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server, Environment::Production);
        let err = gw.send(request("Baichuan-M2-Plus", false)).await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::Rejected {
                status: 401,
                body: "invalid api key".into()
            }
        );
    }

    #[tokio::test]
    async fn recovers_after_one_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output_text": "ok"})))
            .mount(&server)
            .await;

        let gw = gateway(&server, Environment::Production);
        let body = completion_body(gw.send(request("Baichuan-M2-Plus", false)).await.unwrap());
        assert_eq!(body["output_text"], "ok");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unparseable_completion_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let gw = gateway(&server, Environment::Production);
        let err = gw.send(request("Baichuan-M2-Plus", false)).await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse(_)));
    }
}
