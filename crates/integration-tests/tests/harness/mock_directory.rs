//! Mock tool directory for integration tests
//!
//! Serves the directory REST surface: one connected account (`github`),
//! a couple of known applications, tool schemas, and an execution
//! endpoint that counts calls.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing, Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;

pub struct MockDirectory {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockDirectoryState>,
}

struct MockDirectoryState {
    execute_count: AtomicU32,
}

impl MockDirectory {
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockDirectoryState {
            execute_count: AtomicU32::new(0),
        });

        let app = Router::new()
            .route("/connected_accounts", routing::get(handle_accounts))
            .route("/apps/{app}", routing::get(handle_app_info))
            .route("/apps/{app}/connections", routing::post(handle_register))
            .route("/tools/{tool}", routing::get(handle_tool_schema))
            .route("/tools/{tool}/execute", routing::post(handle_execute))
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

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of tool executions received
    pub fn execute_count(&self) -> u32 {
        self.state.execute_count.load(Ordering::SeqCst)
    }
}

impl Drop for MockDirectory {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_accounts() -> Json<serde_json::Value> {
    Json(json!({
        "items": [{"id": "conn-github", "app": "github"}],
        "next_cursor": null
    }))
}

async fn handle_app_info(Path(app): Path<String>) -> impl IntoResponse {
    match app.as_str() {
        "github" | "slack" => Json(json!({
            "slug": app,
            "auth_schemes": ["OAUTH2"],
            "no_auth": false
        }))
        .into_response(),
        "weather" => Json(json!({
            "slug": app,
            "auth_schemes": [],
            "no_auth": true
        }))
        .into_response(),
        "vault" => Json(json!({
            "slug": app,
            "auth_schemes": ["API_KEY"],
            "no_auth": false
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, "unknown app").into_response(),
    }
}

async fn handle_tool_schema(Path(tool): Path<String>) -> Json<serde_json::Value> {
    Json(json!({
        "name": tool,
        "description": "mock tool",
        "parameters": {
            "type": "object",
            "properties": {"title": {"type": "string", "default": "untitled"}}
        }
    }))
}

async fn handle_execute(
    State(state): State<Arc<MockDirectoryState>>,
    Path(tool): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.execute_count.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "tool": tool,
        "connected_account_id": body["connected_account_id"],
        "result": "ok"
    }))
}

async fn handle_register(Path(app): Path<String>, Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(json!({
        "id": "conn-new",
        "app": app,
        "auth_scheme": body["auth_scheme"]
    }))
}
