//! `brave_local_search` tool
//!
//! Local business search with automatic fallback to web search.

use super::{extract_query, extract_u32};
use crate::search::{SearchOrchestrator, DEFAULT_LOCAL_COUNT};
use crate::tools::{Tool, ToolDescription, ToolError};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const TOOL_NAME: &str = "brave_local_search";

const DESCRIPTION: &str = "Searches for local businesses and places using Brave's Local Search API. \
Best for queries related to physical locations, businesses, restaurants, services, etc. \
Returns detailed information including:\n\
- Business names and addresses\n\
- Ratings and review counts\n\
- Phone numbers and opening hours\n\
Use this when the query implies 'near me' or mentions specific locations. \
Automatically falls back to web search if no local results are found.";

/// Local search tool backed by the search orchestrator
pub struct BraveLocalSearchTool {
    orchestrator: SearchOrchestrator,
}

impl BraveLocalSearchTool {
    pub fn new(orchestrator: SearchOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Pull `(query, count)` out of validated arguments (pure function)
    fn extract_arguments(parameters: &Value) -> Result<(&str, u32), ToolError> {
        Ok((
            extract_query(parameters)?,
            extract_u32(parameters, "count", DEFAULT_LOCAL_COUNT),
        ))
    }
}

#[async_trait]
impl Tool for BraveLocalSearchTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: TOOL_NAME.to_string(),
            description: DESCRIPTION.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Local search query (e.g. 'pizza near Central Park')"
                    },
                    "count": {
                        "type": "integer",
                        "minimum": 0,
                        "default": DEFAULT_LOCAL_COUNT,
                        "description": "Number of results (1-20, default 5)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, parameters: &Value) -> Result<String, ToolError> {
        let (query, count) = Self::extract_arguments(parameters)?;
        Ok(self.orchestrator.local_search(query, count).await?)
    }
}
