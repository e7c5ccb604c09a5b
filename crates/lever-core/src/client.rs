use reqwest::Client;
use tracing::{debug, warn};

use crate::api::{PromptRequest, TextResponse, MESSAGE_PATH};
use crate::error::SendError;
use crate::session::PendingSend;

/// HTTP client for the completion proxy, used by the chat front-ends.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("{}{MESSAGE_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post the pending prompt and return the reply text.
    pub async fn send(&self, pending: &PendingSend) -> Result<String, SendError> {
        let request = PromptRequest {
            prompt: pending.prompt(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(SendError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("proxy returned {status}: {body}");
            return Err(SendError::Status(status));
        }

        let reply: TextResponse = response.json().await.map_err(SendError::Decode)?;
        debug!(chars = reply.text.len(), "reply received");
        Ok(reply.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn pending(text: &str) -> PendingSend {
        PendingSend { text: text.to_string() }
    }

    #[test]
    fn test_url_points_at_message_endpoint() {
        assert_eq!(
            ProxyClient::new("http://127.0.0.1:3000/").url(),
            "http://127.0.0.1:3000/api/message"
        );
    }

    #[tokio::test]
    async fn test_send_posts_prompt_with_newline() {
        // Echo the received prompt back as the reply text
        let app = Router::new().route(
            MESSAGE_PATH,
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "text": body["prompt"].as_str().unwrap_or_default() }))
            }),
        );
        let base = spawn(app).await;

        let reply = ProxyClient::new(&base).send(&pending("hi")).await.unwrap();
        assert_eq!(reply, "hi\n");
    }

    #[tokio::test]
    async fn test_send_non_success_status() {
        let app = Router::new().route(
            MESSAGE_PATH,
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": { "kind": "request", "message": "boom" } })),
                )
            }),
        );
        let base = spawn(app).await;

        let err = ProxyClient::new(&base).send(&pending("hi")).await.unwrap_err();
        assert!(matches!(err, SendError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_send_reply_without_text_is_decode_error() {
        let app = Router::new().route(MESSAGE_PATH, post(|| async { Json(json!({ "nope": 1 })) }));
        let base = spawn(app).await;

        let err = ProxyClient::new(&base).send(&pending("hi")).await.unwrap_err();
        assert!(matches!(err, SendError::Decode(_)));
    }
}
