//! Builtin Brave search tools
//!
//! Each tool has its own module with pure argument extraction separated from
//! the search I/O, which is delegated to the [`SearchOrchestrator`].
//!
//! [`SearchOrchestrator`]: crate::search::SearchOrchestrator

pub mod local_search;
pub mod web_search;

pub use local_search::BraveLocalSearchTool;
pub use web_search::BraveWebSearchTool;

use crate::tools::ToolError;
use serde_json::Value;

/// Extract the required `query` string (pure function)
fn extract_query(parameters: &Value) -> Result<&str, ToolError> {
    parameters
        .get("query")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::ValidationError("Query parameter is required".to_string()))
}

/// Extract an optional non-negative integer, saturating at `u32::MAX` (pure function)
///
/// JSON Schema `integer` admits whole-valued floats such as `50.0`, so those
/// are accepted alongside plain integers.
fn extract_u32(parameters: &Value, key: &str, default: u32) -> u32 {
    let Some(value) = parameters.get(key) else {
        return default;
    };

    if let Some(n) = value.as_u64() {
        return u32::try_from(n).unwrap_or(u32::MAX);
    }

    match value.as_f64() {
        // `as` saturates float-to-int casts
        Some(n) if n >= 0.0 && n.fract() == 0.0 => n as u32,
        _ => default,
    }
}
