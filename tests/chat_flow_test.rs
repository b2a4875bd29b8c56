//! End-to-end chat flow: router -> agent -> OpenAI-compatible client -> mock provider.

use axum::{
    body::{ self, Body },
    extract::State,
    http::{ header::CONTENT_TYPE, Request, StatusCode },
    routing::post,
    Json,
    Router,
};
use clap::Parser;
use portfolio_chat::{ agent::ChatAgent, cli::Args, server::api };
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };
use std::time::Duration;
use tower::ServiceExt;

#[derive(Clone)]
struct MockProvider {
    replies: Arc<Mutex<Vec<(StatusCode, Value)>>>,
    delay: Duration,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockProvider {
    fn new(replies: Vec<(StatusCode, Value)>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            delay: Duration::ZERO,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn completions(
    State(mock): State<MockProvider>,
    Json(payload): Json<Value>
) -> (StatusCode, Json<Value>) {
    mock.requests.lock().unwrap().push(payload);
    tokio::time::sleep(mock.delay).await;
    let next = {
        let mut replies = mock.replies.lock().unwrap();
        if replies.is_empty() { None } else { Some(replies.remove(0)) }
    };
    let (status, body) = next.unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({})));
    (status, Json(body))
}

async fn spawn_provider(mock: MockProvider) -> String {
    let app = Router::new().route("/v1/chat/completions", post(completions)).with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn text(content: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        }),
    )
}

fn app(base_url: &str, extra: &[&str]) -> Router {
    let mut argv = vec![
        "portfolio-chat",
        "--chat-api-key",
        "sk-test",
        "--chat-base-url",
        base_url,
        "--persona-name",
        "Ada",
        "--summary-path",
        "tests/does-not-exist/summary.txt",
        "--resume-path",
        "tests/does-not-exist/resume.txt",
    ];
    argv.extend_from_slice(extra);
    let args = Args::try_parse_from(argv).unwrap();
    let agent = ChatAgent::new(&args).unwrap();
    api::router(api::AppState::new(Arc::new(agent)))
}

async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn hello_round_trip() {
    let mock = MockProvider::new(vec![text("Hello!")]);
    let base = spawn_provider(mock.clone()).await;

    let (status, json) = post_chat(app(&base, &[]), json!({ "message": "Hi", "history": [] })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "response": "Hello!", "success": true }));

    let requests = mock.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let messages = requests[0]["messages"].as_array().unwrap();
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"].as_str().unwrap().contains("Resume information unavailable"));
    assert_eq!(messages.last().unwrap()["content"], "Hi");
    assert_eq!(requests[0]["tools"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_message_never_reaches_provider() {
    let mock = MockProvider::new(vec![text("unused")]);
    let base = spawn_provider(mock.clone()).await;

    let (status, json) = post_chat(app(&base, &[]), json!({ "message": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn provider_timeout_yields_failure_payload() {
    let mut mock = MockProvider::new(vec![text("too late")]);
    mock.delay = Duration::from_secs(3);
    let base = spawn_provider(mock.clone()).await;

    let (status, json) = post_chat(
        app(&base, &["--request-timeout-secs", "1"]),
        json!({ "message": "Hi" })
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["response"], api::PROVIDER_FAILURE_MESSAGE);
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn rate_limited_provider_is_a_server_error() {
    let mock = MockProvider::new(
        vec![(StatusCode::TOO_MANY_REQUESTS, json!({ "error": { "message": "quota" } }))]
    );
    let base = spawn_provider(mock.clone()).await;

    let (status, json) = post_chat(app(&base, &[]), json!({ "message": "Hi" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!json.to_string().contains("quota"));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn tool_call_then_answer() {
    let tool_reply = (
        StatusCode::OK,
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {
                            "name": "record_unknown_question",
                            "arguments": "{\"question\":\"What is your shoe size?\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }),
    );
    let mock = MockProvider::new(vec![tool_reply, text("I'm not sure, but I've noted it.")]);
    let base = spawn_provider(mock.clone()).await;

    let (status, json) = post_chat(
        app(&base, &[]),
        json!({ "message": "What is your shoe size?", "user_id": "visitor-3" })
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response"], "I'm not sure, but I've noted it.");

    let requests = mock.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let messages = requests[1]["messages"].as_array().unwrap();
    let last = messages.last().unwrap();
    assert_eq!(last["role"], "tool");
    assert_eq!(last["tool_call_id"], "call_9");
    assert_eq!(messages[messages.len() - 2]["tool_calls"][0]["id"], "call_9");
}

#[tokio::test]
async fn tools_disabled_sends_no_tools() {
    let mock = MockProvider::new(vec![text("Hello!")]);
    let base = spawn_provider(mock.clone()).await;

    let (status, _) = post_chat(
        app(&base, &["--enable-tools", "false"]),
        json!({ "message": "Hi" })
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert!(mock.requests.lock().unwrap()[0].get("tools").is_none());
}
