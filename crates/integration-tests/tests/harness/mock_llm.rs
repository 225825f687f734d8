//! Mock LLM backend for integration tests
//!
//! Speaks just enough of the OpenAI chat-completions protocol: canned
//! JSON envelopes, SSE streams, and an optional scripted tool call on
//! the first request.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{routing, Json, Router};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Mock LLM backend that returns predictable responses
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

struct MockLlmState {
    completion_count: AtomicU32,
    /// Response text for the final (non-tool) completion
    content: String,
    /// Tool name to call on the first completion, when scripted
    tool_call: Option<String>,
    /// Body of the most recent completion request
    last_request: Mutex<Option<Value>>,
}

impl MockLlm {
    /// Start the mock server with the default canned response
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner("Hello from mock", None).await
    }

    /// Start a mock whose final completion returns `content`
    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::start_inner(content, None).await
    }

    /// Start a mock that answers the first completion with a call to
    /// `tool`, then finishes with `content`
    pub async fn start_with_tool_call(tool: &str, content: &str) -> anyhow::Result<Self> {
        Self::start_inner(content, Some(tool.to_owned())).await
    }

    async fn start_inner(content: &str, tool_call: Option<String>) -> anyhow::Result<Self> {
        let state = Arc::new(MockLlmState {
            completion_count: AtomicU32::new(0),
            content: content.to_owned(),
            tool_call,
            last_request: Mutex::new(None),
        });

        let app = Router::new()
            .route("/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a vendor
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of completion requests received
    pub fn completion_count(&self) -> u32 {
        self.state.completion_count.load(Ordering::SeqCst)
    }

    /// Body of the most recent completion request
    pub fn last_request(&self) -> Option<Value> {
        self.state.last_request.lock().unwrap().clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_chat_completions(State(state): State<Arc<MockLlmState>>, Json(body): Json<Value>) -> Response {
    let count = state.completion_count.fetch_add(1, Ordering::SeqCst);
    *state.last_request.lock().unwrap() = Some(body.clone());

    let model = body["model"].as_str().unwrap_or("mock-model").to_owned();
    let stream = body["stream"].as_bool().unwrap_or(false);

    if stream {
        return sse_response(&model, &state.content);
    }

    if let Some(tool) = &state.tool_call
        && count == 0
    {
        return Json(json!({
            "id": "mock-tool-turn",
            "object": "chat.completion",
            "created": 1,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call-1",
                        "type": "function",
                        "function": {"name": tool, "arguments": "{\"title\":\"hi\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .into_response();
    }

    Json(json!({
        "id": "",
        "object": "chat.completion",
        "created": 1,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": state.content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 7, "completion_tokens": 3, "total_tokens": 10}
    }))
    .into_response()
}

/// Streams the content in two chunks, then usage, then `[DONE]`.
fn sse_response(model: &str, content: &str) -> Response {
    let mid = content.len() / 2;
    let (first, second) = content.split_at(mid);

    let mut body = String::new();
    for chunk_text in [first, second] {
        let chunk = json!({
            "id": "mock-stream",
            "object": "chat.completion.chunk",
            "created": 1,
            "model": model,
            "choices": [{"index": 0, "delta": {"content": chunk_text}, "finish_reason": null}]
        });
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    let finish = json!({
        "id": "mock-stream",
        "object": "chat.completion.chunk",
        "created": 1,
        "model": model,
        "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 7, "completion_tokens": 3, "total_tokens": 10}
    });
    body.push_str(&format!("data: {finish}\n\ndata: [DONE]\n\n"));

    Response::builder()
        .header("content-type", "text/event-stream")
        .body(axum::body::Body::from(body))
        .unwrap()
}
