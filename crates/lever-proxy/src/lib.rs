//! Completion proxy
//!
//! A single-endpoint HTTP server: `POST /api/message` takes `{prompt}`, sends
//! it to the upstream completion service and answers with `{text}`. The
//! upstream client is built once at startup and injected as router state.

mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::{routing::post, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use lever_core::api::MESSAGE_PATH;
use lever_core::CompletionClient;

pub use handlers::ProxyError;

/// State shared by request handlers
#[derive(Clone)]
pub(crate) struct ProxyState {
    client: Arc<dyn CompletionClient>,
}

/// Build the proxy router around an upstream client.
pub fn router(client: Arc<dyn CompletionClient>) -> Router {
    Router::new()
        .route(
            MESSAGE_PATH,
            post(handlers::handle_message).fallback(handlers::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(ProxyState { client })
}

pub struct Server {
    client: Arc<dyn CompletionClient>,
}

impl Server {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn run<F>(self, addr: &str, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener (port 0 in tests).
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("proxy listening on http://{}{MESSAGE_PATH}", listener.local_addr()?);
        axum::serve(listener, router(self.client))
            .with_graceful_shutdown(shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lever_core::api::{NO_RESPONSE_TEXT, ONLY_POST_MESSAGE};
    use lever_core::{Candidate, CompletionError};
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Upstream stand-in that records prompts and returns a canned result.
    struct FakeClient {
        reply: fn() -> Result<Vec<Candidate>, CompletionError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn new(reply: fn() -> Result<Vec<Candidate>, CompletionError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, prompt: &str) -> Result<Vec<Candidate>, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            (self.reply)()
        }
    }

    fn hello() -> Result<Vec<Candidate>, CompletionError> {
        Ok(vec![Candidate { text: Some("Hello".to_string()) }])
    }

    fn no_candidates() -> Result<Vec<Candidate>, CompletionError> {
        Ok(Vec::new())
    }

    fn upstream_down() -> Result<Vec<Candidate>, CompletionError> {
        Err(CompletionError::Decode("unexpected end of input".to_string()))
    }

    async fn spawn(client: Arc<FakeClient>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(Server::new(client).serve(listener, std::future::pending()));
        format!("http://{addr}{MESSAGE_PATH}")
    }

    async fn post_json(url: &str, body: Value) -> (StatusCode, Value) {
        let response = reqwest::Client::new().post(url).json(&body).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_post_returns_first_candidate() {
        let client = FakeClient::new(hello);
        let url = spawn(client.clone()).await;

        let (status, body) = post_json(&url, json!({ "prompt": "hi\n" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": "Hello" }));
        assert_eq!(*client.prompts.lock().unwrap(), vec!["hi\n".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_candidates_return_placeholder() {
        let url = spawn(FakeClient::new(no_candidates)).await;
        let (status, body) = post_json(&url, json!({ "prompt": "hi\n" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": NO_RESPONSE_TEXT }));
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_500_with_error() {
        let url = spawn(FakeClient::new(upstream_down)).await;
        let (status, body) = post_json(&url, json!({ "prompt": "hi\n" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["kind"], "decode");
        assert!(body["error"]["message"].as_str().unwrap().contains("unexpected end"));
    }

    #[tokio::test]
    async fn test_non_post_methods_return_405() {
        let client = FakeClient::new(hello);
        let url = spawn(client.clone()).await;
        let http = reqwest::Client::new();

        for request in [http.get(&url), http.put(&url), http.delete(&url), http.patch(&url)] {
            let response = request.send().await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers()["allow"], "POST");
            let body: Value = response.json().await.unwrap();
            assert_eq!(body, json!({ "message": ONLY_POST_MESSAGE }));
        }
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_prompt_forwards_empty_string() {
        let client = FakeClient::new(hello);
        let url = spawn(client.clone()).await;

        let (status, _) = post_json(&url, json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(*client.prompts.lock().unwrap(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let client = FakeClient::new(hello);
        let url = spawn(client.clone()).await;

        let response = reqwest::Client::new()
            .post(&url)
            .header("content-type", "application/json")
            .body("{ not json")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"]["kind"], "bad_request");
        assert!(client.prompts.lock().unwrap().is_empty());
    }
}
