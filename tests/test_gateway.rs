//! Integration tests for the MCP-over-SSE gateway
//!
//! Message intake is exercised with `warp::test`; the SSE flow runs against a
//! real listener on an ephemeral port.

use brave_search_mcp::gateway::{GatewayServer, McpHandler, ServerInfo};
use brave_search_mcp::observability::HealthService;
use brave_search_mcp::search::{RateLimiter, RateLimits, SearchOrchestrator, WebResult, WebSearchPage};
use brave_search_mcp::testing::MockSearchBackend;
use brave_search_mcp::tools::ToolSystem;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn test_server(backend: MockSearchBackend) -> GatewayServer {
    let tools = Arc::new(ToolSystem::with_search(SearchOrchestrator::new(Arc::new(
        backend,
    ))));
    let handler = McpHandler::new(
        tools,
        ServerInfo {
            name: "example-servers/brave-search".to_string(),
            version: "0.1.0".to_string(),
        },
    );
    let health = HealthService::new(
        "example-servers/brave-search",
        "0.1.0",
        Arc::new(RateLimiter::new(RateLimits::default())),
    );
    GatewayServer::new(handler, health)
}

fn pizza_backend() -> MockSearchBackend {
    MockSearchBackend::new().with_web_page(WebSearchPage {
        results: vec![WebResult {
            title: "Pizza Guide".to_string(),
            description: "Where to eat".to_string(),
            url: "https://guide.example".to_string(),
        }],
        locations: vec![],
    })
}

/// Wait for the next queued response on a session stream
async fn next_message(stream: &mut brave_search_mcp::gateway::SessionStream) -> Value {
    let payload = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("timed out waiting for response")
        .expect("session stream ended");
    serde_json::from_str(&payload).unwrap()
}

#[tokio::test]
async fn test_message_for_unknown_session_is_rejected() {
    let server = test_server(MockSearchBackend::new());

    let response = warp::test::request()
        .method("POST")
        .path("/messages?sessionId=does-not-exist")
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(
        body,
        json!({"success": false, "error": {"message": "No transport found for sessionId"}})
    );
}

#[tokio::test]
async fn test_message_without_session_id_is_rejected() {
    let server = test_server(MockSearchBackend::new());

    let response = warp::test::request()
        .method("POST")
        .path("/messages")
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = test_server(MockSearchBackend::new());
    let (session_id, _stream) = server.sessions().open();

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/messages?sessionId={session_id}"))
        .body("{not json")
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_accepted_message_is_answered_on_stream() {
    let server = test_server(pizza_backend());
    let (session_id, mut stream) = server.sessions().open();

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/messages?sessionId={session_id}"))
        .body(
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": {"name": "brave_web_search", "arguments": {"query": "pizza"}}
            })
            .to_string(),
        )
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), 202);
    assert_eq!(response.body(), "Accepted");

    let message = next_message(&mut stream).await;
    assert_eq!(message["id"], 7);
    assert_eq!(
        message["result"]["content"][0]["text"],
        "Title: Pizza Guide\nDescription: Where to eat\nURL: https://guide.example"
    );
    assert!(message["result"].get("isError").is_none());
}

#[tokio::test]
async fn test_tool_failure_is_reported_in_band() {
    let backend = MockSearchBackend::new()
        .with_web_error(brave_search_mcp::SearchError::RateLimitExceeded);
    let server = test_server(backend);
    let (session_id, mut stream) = server.sessions().open();

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/messages?sessionId={session_id}"))
        .body(
            json!({
                "jsonrpc": "2.0",
                "id": "call-1",
                "method": "tools/call",
                "params": {"name": "brave_web_search", "arguments": {"query": "pizza"}}
            })
            .to_string(),
        )
        .reply(&server.routes())
        .await;
    assert_eq!(response.status(), 202);

    let message = next_message(&mut stream).await;
    assert_eq!(message["id"], "call-1");
    assert_eq!(message["result"]["isError"], true);
    assert_eq!(
        message["result"]["content"][0]["text"],
        "Error: Rate limit exceeded"
    );
}

#[tokio::test]
async fn test_dropping_stream_closes_session() {
    let server = test_server(MockSearchBackend::new());
    let (session_id, stream) = server.sessions().open();
    assert!(server.sessions().contains(&session_id));

    drop(stream);

    assert!(!server.sessions().contains(&session_id));
    let response = warp::test::request()
        .method("POST")
        .path(&format!("/messages?sessionId={session_id}"))
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
        .reply(&server.routes())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_health_route_is_served_by_gateway() {
    let server = test_server(MockSearchBackend::new());

    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["status"], "healthy");
}

/// Read SSE chunks until `needle` appears
async fn read_until(response: &mut reqwest::Response, buffer: &mut String, needle: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !buffer.contains(needle) {
            let chunk = response
                .chunk()
                .await
                .unwrap()
                .expect("SSE stream ended early");
            buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .expect("timed out reading SSE stream");
}

#[tokio::test]
async fn test_sse_flow_over_real_listener() {
    let server = test_server(pizza_backend());
    let (addr, serving) = warp::serve(server.routes()).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(serving);

    let http = reqwest::Client::new();
    let mut sse = http
        .get(format!("http://{addr}/sse"))
        .send()
        .await
        .unwrap();
    assert_eq!(sse.status(), 200);

    let mut buffer = String::new();
    read_until(&mut sse, &mut buffer, "\n\n").await;
    assert!(buffer.contains("event:endpoint"));

    let endpoint = buffer
        .lines()
        .find_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .expect("endpoint event has data")
        .to_string();
    assert!(endpoint.starts_with("/messages?sessionId="));

    let post = http
        .post(format!("http://{addr}{endpoint}"))
        .header("content-type", "application/json")
        .body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
            })
            .to_string(),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(post.status(), 202);

    read_until(&mut sse, &mut buffer, "protocolVersion").await;
    assert!(buffer.contains("event:message"));
    assert!(buffer.contains("example-servers/brave-search"));
}
