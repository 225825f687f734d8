mod harness;

use harness::config::ConfigBuilder;
use harness::mock_directory::MockDirectory;
use harness::server::TestServer;

#[tokio::test]
async fn list_models_returns_the_catalog() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(&config).await.unwrap();

    let resp = server.client().get(server.url("/models")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["object"], "list");
    let ids: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"openai/gpt-4.1"));
    assert!(ids.contains(&"anthropic/claude-sonnet-4"));
    assert_eq!(json["data"][0]["object"], "model");
}

#[tokio::test]
async fn model_icon_redirects_to_the_catalog_url() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(&config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/images/models/openai/gpt-4.1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 307);
    let location = resp.headers().get("location").unwrap().to_str().unwrap();
    assert!(location.starts_with("http"));
}

#[tokio::test]
async fn unknown_model_icon_is_404() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(&config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/images/models/no-such/model"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn tool_icon_redirects_under_the_directory() {
    let directory = MockDirectory::start().await.unwrap();
    let config = ConfigBuilder::new().with_tool_directory(&directory.base_url()).build();
    let server = TestServer::start(&config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/images/tools/github.create_issue"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 307);
    let location = resp.headers().get("location").unwrap().to_str().unwrap();
    assert!(location.ends_with("/github/icon"));
}

#[tokio::test]
async fn tool_icon_without_a_directory_is_404() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(&config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/images/tools/github.create_issue"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
