//! `brave_web_search` tool
//!
//! General web search through the Brave Search API.

use super::{extract_query, extract_u32};
use crate::search::{SearchOrchestrator, DEFAULT_WEB_COUNT};
use crate::tools::{Tool, ToolDescription, ToolError};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const TOOL_NAME: &str = "brave_web_search";

const DESCRIPTION: &str = "Performs a web search using the Brave Search API, ideal for general queries, news, articles, and online content. \
Use this for broad information gathering, recent events, or when you need diverse web sources. \
Supports pagination, content filtering, and freshness controls. \
Maximum 20 results per request, with offset for pagination. ";

/// Web search tool backed by the search orchestrator
pub struct BraveWebSearchTool {
    orchestrator: SearchOrchestrator,
}

impl BraveWebSearchTool {
    pub fn new(orchestrator: SearchOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Pull `(query, count, offset)` out of validated arguments (pure function)
    fn extract_arguments(parameters: &Value) -> Result<(&str, u32, u32), ToolError> {
        Ok((
            extract_query(parameters)?,
            extract_u32(parameters, "count", DEFAULT_WEB_COUNT),
            extract_u32(parameters, "offset", 0),
        ))
    }
}

#[async_trait]
impl Tool for BraveWebSearchTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: TOOL_NAME.to_string(),
            description: DESCRIPTION.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query (max 400 chars, 50 words)"
                    },
                    "count": {
                        "type": "integer",
                        "minimum": 0,
                        "default": DEFAULT_WEB_COUNT,
                        "description": "Number of results (1-20, default 10)"
                    },
                    "offset": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 0,
                        "description": "Pagination offset (max 9, default 0)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, parameters: &Value) -> Result<String, ToolError> {
        let (query, count, offset) = Self::extract_arguments(parameters)?;
        Ok(self.orchestrator.web_search(query, count, offset).await?)
    }
}
