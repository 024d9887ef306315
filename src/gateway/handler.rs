//! MCP method dispatch
//!
//! Maps JSON-RPC requests onto the tool system. Tool failures are reported
//! in-band as `isError` results; protocol-level problems become JSON-RPC
//! errors.

use crate::error::sanitize_error_message;
use crate::gateway::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::tools::{ToolError, ToolSystem};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Protocol version answered when the client does not state one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Name and version reported in `initialize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
struct TextContent {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct CallToolResult {
    content: Vec<TextContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

impl CallToolResult {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent { kind: "text", text }],
            is_error,
        }
    }
}

/// Stateless MCP request handler shared by all sessions
pub struct McpHandler {
    tools: Arc<ToolSystem>,
    server_info: ServerInfo,
}

impl McpHandler {
    pub fn new(tools: Arc<ToolSystem>, server_info: ServerInfo) -> Self {
        Self { tools, server_info }
    }

    /// Handle one message; notifications produce no response
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Received notification");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params.as_ref()).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": self.server_info,
        })
    }

    fn list_tools(&self) -> Value {
        json!({ "tools": self.tools.list_tools() })
    }

    async fn call_tool(&self, params: Option<&Value>) -> Result<Value, JsonRpcError> {
        let name = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| JsonRpcError::invalid_params("Missing tool name"))?;
        let arguments = params
            .and_then(|p| p.get("arguments"))
            .filter(|a| !a.is_null())
            .cloned()
            .unwrap_or_else(|| json!({}));

        let result = match self.tools.execute_tool(name, &arguments).await {
            Ok(text) => CallToolResult::text(text, false),
            Err(error) if error.is_invalid_request() => {
                return Err(JsonRpcError::invalid_params(error.to_string()));
            }
            Err(ToolError::SchemaError(message)) => {
                return Err(JsonRpcError::internal_error(message));
            }
            Err(error) => {
                warn!(tool = name, error = %error, "Tool execution failed");
                CallToolResult::text(
                    format!("Error: {}", sanitize_error_message(&error.to_string())),
                    true,
                )
            }
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::gateway::jsonrpc::{INVALID_PARAMS, METHOD_NOT_FOUND};
    use crate::search::SearchOrchestrator;
    use crate::testing::MockSearchBackend;

    fn handler(backend: MockSearchBackend) -> McpHandler {
        let tools = ToolSystem::with_search(SearchOrchestrator::new(Arc::new(backend)));
        McpHandler::new(
            Arc::new(tools),
            ServerInfo {
                name: "example-servers/brave-search".to_string(),
                version: "0.1.0".to_string(),
            },
        )
    }

    async fn call(handler: &McpHandler, method: &str, params: Option<Value>) -> JsonRpcResponse {
        handler
            .handle(JsonRpcRequest::new(1, method, params))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let handler = handler(MockSearchBackend::new());

        let response = call(
            &handler,
            "initialize",
            Some(json!({"protocolVersion": "2025-03-26"})),
        )
        .await;
        let result = response.result.unwrap();

        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "example-servers/brave-search");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_defaults_protocol_version() {
        let handler = handler(MockSearchBackend::new());
        let result = call(&handler, "initialize", None).await.result.unwrap();
        assert_eq!(result["protocolVersion"], DEFAULT_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let handler = handler(MockSearchBackend::new());
        let response = handler
            .handle(JsonRpcRequest::notification("notifications/initialized"))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_list_in_registration_order() {
        let handler = handler(MockSearchBackend::new());
        let result = call(&handler, "tools/list", None).await.result.unwrap();

        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["brave_web_search", "brave_local_search"]);
        assert!(result["tools"][0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let handler = handler(MockSearchBackend::new());
        let response = call(&handler, "resources/list", None).await;
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_invalid_params() {
        let handler = handler(MockSearchBackend::new());

        let response = call(
            &handler,
            "tools/call",
            Some(json!({"name": "brave_web_search", "arguments": {"count": 3}})),
        )
        .await;

        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let handler = handler(MockSearchBackend::new());
        let response = call(&handler, "tools/call", Some(json!({"name": "nope"}))).await;
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tool_failure_is_error_result() {
        let handler = handler(
            MockSearchBackend::new().with_web_error(SearchError::RateLimitExceeded),
        );

        let response = call(
            &handler,
            "tools/call",
            Some(json!({"name": "brave_web_search", "arguments": {"query": "rust"}})),
        )
        .await;
        let result = response.result.unwrap();

        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "Error: Rate limit exceeded");
    }

    #[tokio::test]
    async fn test_tool_success_omits_is_error() {
        let handler = handler(MockSearchBackend::new());

        let response = call(
            &handler,
            "tools/call",
            Some(json!({"name": "brave_local_search", "arguments": {"query": "pizza"}})),
        )
        .await;
        let result = response.result.unwrap();

        assert!(result.get("isError").is_none());
        assert_eq!(result["content"][0]["text"], "");
    }
}
