//! Chat session -> proxy client -> proxy server -> stand-in upstream, all on
//! ephemeral local ports.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use lever_core::api::{FALLBACK_REPLY, NO_RESPONSE_TEXT};
use lever_core::{Author, ChatKey, ChatSession, OpenAIClient, ProxyClient};
use lever_proxy::Server;

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    reply: Value,
    prompts: Arc<Mutex<Vec<String>>>,
}

async fn completions(
    State(upstream): State<Upstream>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let prompt = request["prompt"].as_str().unwrap_or_default().to_string();
    upstream.prompts.lock().unwrap().push(prompt);
    (upstream.status, Json(upstream.reply.clone()))
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

/// Start upstream and proxy; returns the proxy base URL and the prompts seen upstream.
async fn start(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<String>>>) {
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let upstream = Upstream {
        status,
        reply,
        prompts: prompts.clone(),
    };

    let (upstream_listener, upstream_base) = bind().await;
    let app = Router::new()
        .route("/v1/completions", post(completions))
        .with_state(upstream);
    tokio::spawn(async move {
        axum::serve(upstream_listener, app).await.unwrap();
    });

    let (proxy_listener, proxy_base) = bind().await;
    let client = Arc::new(OpenAIClient::new("sk-test", &upstream_base));
    tokio::spawn(Server::new(client).serve(proxy_listener, std::future::pending()));

    (proxy_base, prompts)
}

async fn exchange(session: &mut ChatSession, proxy: &ProxyClient, text: &str) {
    session.handle_input_change(text);
    let pending = session
        .handle_key(ChatKey::Enter)
        .expect("non-empty draft should submit");
    let outcome = proxy.send(&pending).await;
    session.complete_send(outcome);
}

#[tokio::test]
async fn test_reply_flows_back_into_history() {
    let (proxy_base, prompts) = start(
        StatusCode::OK,
        json!({ "choices": [{ "text": "\n\nHello there", "index": 0 }] }),
    )
    .await;

    let proxy = ProxyClient::new(&proxy_base);
    let mut session = ChatSession::new();
    exchange(&mut session, &proxy, "hi").await;

    assert!(!session.loading());
    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].author, Author::User);
    assert_eq!(history[0].text, "hi");
    assert_eq!(history[1].author, Author::Ai);
    assert_eq!(history[1].text, "\n\nHello there");

    assert_eq!(*prompts.lock().unwrap(), vec!["hi\n".to_string()]);
}

#[tokio::test]
async fn test_empty_choices_show_placeholder() {
    let (proxy_base, _) = start(StatusCode::OK, json!({ "choices": [] })).await;

    let proxy = ProxyClient::new(&proxy_base);
    let mut session = ChatSession::new();
    exchange(&mut session, &proxy, "hi").await;

    assert_eq!(session.history()[1].text, NO_RESPONSE_TEXT);
}

#[tokio::test]
async fn test_upstream_error_appends_single_fallback() {
    let (proxy_base, _) = start(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "Rate limit reached" } }),
    )
    .await;

    // The proxy reports a sanitized 500
    let response = reqwest::Client::new()
        .post(format!("{proxy_base}/api/message"))
        .json(&json!({ "prompt": "hi\n" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["kind"], "status");
    assert_eq!(body["error"]["status"], 429);
    assert!(!body.to_string().contains("Rate limit reached"));

    // The chat shows exactly one fallback reply
    let proxy = ProxyClient::new(&proxy_base);
    let mut session = ChatSession::new();
    exchange(&mut session, &proxy, "hi").await;

    assert!(!session.loading());
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history()[1].author, Author::Ai);
    assert_eq!(session.history()[1].text, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_unreachable_proxy_still_clears_loading() {
    let (listener, base) = bind().await;
    drop(listener);

    let proxy = ProxyClient::new(&base);
    let mut session = ChatSession::new();
    exchange(&mut session, &proxy, "hi").await;

    assert!(!session.loading());
    assert_eq!(session.history()[1].text, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_multi_turn_sends_only_latest_prompt() {
    let (proxy_base, prompts) =
        start(StatusCode::OK, json!({ "choices": [{ "text": "ok" }] })).await;

    let proxy = ProxyClient::new(&proxy_base);
    let mut session = ChatSession::new();
    exchange(&mut session, &proxy, "first").await;
    exchange(&mut session, &proxy, "second").await;

    assert_eq!(session.history().len(), 4);
    assert_eq!(
        *prompts.lock().unwrap(),
        vec!["first\n".to_string(), "second\n".to_string()]
    );
}
