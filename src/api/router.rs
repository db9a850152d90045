//! API router.
//!
//! Returns a composable `Router` with every route under `/api/`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// CORS is permissive so browser front-ends on other origins can call
/// the API directly.
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/chat", post(endpoints::chat::complete))
        .route("/meta", post(endpoints::meta::lookup))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::Environment;
    use crate::upstream::{ChatGateway, UpstreamConfig, DEV_MODE_REPLY};

    fn upstream_for(server: &MockServer, key: Option<&str>) -> UpstreamConfig {
        UpstreamConfig {
            baichuan_endpoint: format!("{}/baichuan", server.uri()),
            deepseek_endpoint: format!("{}/deepseek", server.uri()),
            baichuan_api_key: key.map(str::to_string),
            deepseek_api_key: None,
        }
    }

    fn router_for(server: &MockServer, key: Option<&str>, environment: Environment) -> Router {
        api_router(ApiContext::with_gateway(ChatGateway::new(
            upstream_for(server, key),
            environment,
        )))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let server = MockServer::start().await;
        let app = router_for(&server, None, Environment::Development);
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn chat_without_key_in_development_returns_canned_reply() {
        let server = MockServer::start().await;
        let app = router_for(&server, None, Environment::Development);
        let response = app
            .oneshot(post_json(
                "/api/chat",
                json!({"messages": [{"role": "user", "content": "高血圧"}], "stream": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["choices"][0]["message"]["content"], DEV_MODE_REPLY);
    }

    #[tokio::test]
    async fn chat_without_key_in_production_is_config_error() {
        let server = MockServer::start().await;
        let app = router_for(&server, None, Environment::Production);
        let response = app
            .oneshot(post_json(
                "/api/chat",
                json!({"messages": [{"role": "user", "content": "q"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "CONFIG_MISSING");
    }

    #[tokio::test]
    async fn chat_relays_event_stream() {
        let server = MockServer::start().await;
        let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n\
                   data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n\n\
                   data: [DONE]\n\n";
        Mock::given(method("POST"))
            .and(path("/baichuan"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let app = router_for(&server, Some("bc-test"), Environment::Production);
        let response = app
            .oneshot(post_json(
                "/api/chat",
                json!({"messages": [{"role": "user", "content": "q"}], "stream": true}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, sse.as_bytes());
    }

    #[tokio::test]
    async fn chat_rejection_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/baichuan"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let app = router_for(&server, Some("bc-test"), Environment::Production);
        let response = app
            .oneshot(post_json(
                "/api/chat",
                json!({"messages": [{"role": "user", "content": "q"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "slow down");
    }

    #[tokio::test]
    async fn chat_requires_messages() {
        let server = MockServer::start().await;
        let app = router_for(&server, None, Environment::Development);
        let response = app
            .oneshot(post_json("/api/chat", json!({"messages": []})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn meta_rejects_non_http_urls() {
        let server = MockServer::start().await;
        let app = router_for(&server, None, Environment::Development);
        let response = app
            .oneshot(post_json("/api/meta", json!({"url": "javascript:alert(1)"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn meta_extracts_title_and_doi() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><title>Blood Pressure &amp; Risk</title>
                <meta name="citation_doi" content="10.1161/HYP.0000000000000065"></head></html>"#,
            ))
            .mount(&server)
            .await;

        let app = router_for(&server, None, Environment::Development);
        let url = format!("{}/article", server.uri());
        let response = app
            .oneshot(post_json("/api/meta", json!({"url": url, "targetLang": "en"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["originTitle"], "Blood Pressure & Risk");
        assert_eq!(json["doi"], "10.1161/HYP.0000000000000065");
        assert!(json["translatedTitle"].is_null());
    }

    #[tokio::test]
    async fn meta_for_missing_page_is_empty_not_error() {
        let server = MockServer::start().await;
        let app = router_for(&server, None, Environment::Development);
        let url = format!("{}/gone", server.uri());
        let response = app
            .oneshot(post_json("/api/meta", json!({"url": url})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["url"], url);
        assert!(json["originTitle"].is_null());
        assert!(json["doi"].is_null());
    }
}
