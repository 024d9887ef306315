//! MCP tool system
//!
//! Tools describe themselves with a JSON Schema for their arguments; the
//! [`ToolSystem`] validates every call against that schema before dispatch
//! and records execution metrics.

use crate::error::SearchError;
use crate::observability::metrics::metrics;
use crate::search::SearchOrchestrator;
use crate::tool_span;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, Instrument};

pub mod builtin;

/// A callable tool exposed to MCP clients
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, human description and argument schema
    fn describe(&self) -> ToolDescription;

    /// Run the tool; `parameters` has already been validated against the schema
    async fn execute(&self, parameters: &Value) -> Result<String, ToolError>;
}

/// Tool description as advertised by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub parameters: Value,
}

/// Registry of tools in registration order
pub struct ToolSystem {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolSystem {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Tool system with both Brave search tools registered
    pub fn with_search(orchestrator: SearchOrchestrator) -> Self {
        let mut system = Self::new();
        system.register(Box::new(builtin::BraveWebSearchTool::new(
            orchestrator.clone(),
        )));
        system.register(Box::new(builtin::BraveLocalSearchTool::new(orchestrator)));
        system
    }

    /// Add a tool; a later registration under the same name replaces the earlier one
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.describe().name;
        self.tools.retain(|existing| existing.describe().name != name);
        self.tools.push(tool);
    }

    fn find(&self, tool_name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.describe().name == tool_name)
            .map(|tool| tool.as_ref())
    }

    /// Get tool description
    pub fn describe_tool(&self, tool_name: &str) -> Option<ToolDescription> {
        self.find(tool_name).map(|tool| tool.describe())
    }

    /// Descriptions of every registered tool
    pub fn list_tools(&self) -> Vec<ToolDescription> {
        self.tools.iter().map(|tool| tool.describe()).collect()
    }

    /// Validate parameters against the tool schema, then execute
    pub async fn execute_tool(&self, tool_name: &str, parameters: &Value) -> Result<String, ToolError> {
        let tool = self
            .find(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        Self::validate_parameters(&tool.describe(), parameters)?;

        let span = tool_span!(tool = tool_name);
        let started = Instant::now();
        let result = tool.execute(parameters).instrument(span).await;

        let elapsed = started.elapsed();
        metrics().tool_executed(tool_name, elapsed, result.is_ok());
        debug!(
            tool = tool_name,
            elapsed_ms = elapsed.as_millis() as u64,
            success = result.is_ok(),
            "Tool execution finished"
        );

        result
    }

    /// Validate parameters against a tool schema (pure function)
    fn validate_parameters(description: &ToolDescription, parameters: &Value) -> Result<(), ToolError> {
        let validator = jsonschema::validator_for(&description.parameters)
            .map_err(|e| ToolError::SchemaError(format!("Schema compilation error: {e}")))?;

        validator.validate(parameters).map_err(|errors| {
            let error_messages: Vec<String> = errors
                .map(|e| format!("At '{}': {}", e.instance_path, e))
                .collect();
            ToolError::ValidationError(error_messages.join("; "))
        })
    }
}

impl Default for ToolSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool system errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Parameter validation failed: {0}")]
    ValidationError(String),
    #[error("Schema error: {0}")]
    SchemaError(String),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ToolError {
    /// Whether the caller sent a bad request, as opposed to the tool failing
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::UnknownTool(_) | Self::ValidationError(_))
    }
}
