mod harness;

use harness::config::ConfigBuilder;
use harness::mock_directory::MockDirectory;
use harness::mock_llm::MockLlm;
use harness::server::TestServer;

#[tokio::test]
async fn unconnected_app_is_403_with_connection_requests() {
    let mock = MockLlm::start().await.unwrap();
    let directory = MockDirectory::start().await.unwrap();
    let config = ConfigBuilder::new()
        .with_openai_vendor(&mock.base_url())
        .with_tool_directory(&directory.base_url())
        .build();
    let server = TestServer::start(&config).await.unwrap();

    let body = serde_json::json!({
        "model": "openai/gpt-4.1",
        "prompt": "Post an update",
        "modelOptions": {"tools": ["slack.send_message"]},
        "user": "user-1"
    });

    let resp = server
        .client()
        .post(server.url("/chat/completions"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["type"], "tool_authorization_required");
    assert_eq!(json["connection_requests"][0]["app"], "slack");
    assert_eq!(json["connection_requests"][0]["methods"][0], "OAUTH2");

    // Nothing was dispatched or executed
    assert_eq!(mock.completion_count(), 0);
    assert_eq!(directory.execute_count(), 0);
}

#[tokio::test]
async fn tool_loop_executes_and_resumes() {
    let mock = MockLlm::start_with_tool_call("github.create_issue", "issue created")
        .await
        .unwrap();
    let directory = MockDirectory::start().await.unwrap();
    let config = ConfigBuilder::new()
        .with_openai_vendor(&mock.base_url())
        .with_tool_directory(&directory.base_url())
        .build();
    let server = TestServer::start(&config).await.unwrap();

    let body = serde_json::json!({
        "model": "openai/gpt-4.1",
        "prompt": "File an issue",
        "modelOptions": {"tools": ["github.create_issue"]},
        "user": "user-1"
    });

    let resp = server
        .client()
        .post(server.url("/chat/completions"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["choices"][0]["message"]["content"], "issue created");
    // Usage is summed across both round trips
    assert_eq!(json["usage"]["prompt_tokens"], 17);
    assert_eq!(json["usage"]["completion_tokens"], 8);
    assert_eq!(json["usage"]["total_tokens"], 25);

    assert_eq!(mock.completion_count(), 2);
    assert_eq!(directory.execute_count(), 1);

    // The resumed request carries the tool result back to the model
    let sent = mock.last_request().unwrap();
    let roles: Vec<&str> = sent["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert!(roles.contains(&"tool"));
}

#[tokio::test]
async fn no_auth_app_needs_no_connection() {
    let mock = MockLlm::start().await.unwrap();
    let directory = MockDirectory::start().await.unwrap();
    let config = ConfigBuilder::new()
        .with_openai_vendor(&mock.base_url())
        .with_tool_directory(&directory.base_url())
        .build();
    let server = TestServer::start(&config).await.unwrap();

    let body = serde_json::json!({
        "model": "openai/gpt-4.1",
        "prompt": "What is the weather?",
        "modelOptions": {"tools": ["weather.lookup"]},
        "user": "user-1"
    });

    let resp = server
        .client()
        .post(server.url("/chat/completions"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The tool definition reached the upstream request
    let sent = mock.last_request().unwrap();
    assert_eq!(sent["tools"][0]["function"]["name"], "weather.lookup");
}

#[tokio::test]
async fn tools_without_a_user_are_rejected() {
    let mock = MockLlm::start().await.unwrap();
    let directory = MockDirectory::start().await.unwrap();
    let config = ConfigBuilder::new()
        .with_openai_vendor(&mock.base_url())
        .with_tool_directory(&directory.base_url())
        .build();
    let server = TestServer::start(&config).await.unwrap();

    let body = serde_json::json!({
        "model": "openai/gpt-4.1",
        "prompt": "File an issue",
        "modelOptions": {"tools": ["github.create_issue"]}
    });

    let resp = server
        .client()
        .post(server.url("/chat/completions"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(mock.completion_count(), 0);
}

#[tokio::test]
async fn register_auth_fields_with_api_key_scheme() {
    let directory = MockDirectory::start().await.unwrap();
    let config = ConfigBuilder::new().with_tool_directory(&directory.base_url()).build();
    let server = TestServer::start(&config).await.unwrap();

    let body = serde_json::json!({
        "scheme": "API_KEY",
        "fields": {"api_key": "secret"},
        "user": "user-1"
    });

    let resp = server
        .client()
        .post(server.url("/tools/vault.read"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["id"], "conn-new");
    assert_eq!(json["app"], "vault");
}

#[tokio::test]
async fn register_rejects_browser_flow_schemes() {
    let directory = MockDirectory::start().await.unwrap();
    let config = ConfigBuilder::new().with_tool_directory(&directory.base_url()).build();
    let server = TestServer::start(&config).await.unwrap();

    let body = serde_json::json!({"scheme": "OAUTH2", "fields": {}, "user": "user-1"});
    let resp = server
        .client()
        .post(server.url("/tools/github.create_issue"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["type"], "unsupported_auth_scheme");
}

#[tokio::test]
async fn register_rejects_unknown_schemes() {
    let directory = MockDirectory::start().await.unwrap();
    let config = ConfigBuilder::new().with_tool_directory(&directory.base_url()).build();
    let server = TestServer::start(&config).await.unwrap();

    let body = serde_json::json!({"scheme": "MAGIC", "fields": {}, "user": "user-1"});
    let resp = server
        .client()
        .post(server.url("/tools/github.create_issue"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["type"], "unknown_auth_scheme");
}
