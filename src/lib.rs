//! Brave Search MCP server
//!
//! Exposes Brave web search and local business search as MCP tools over an
//! HTTP + Server-Sent Events transport.
//!
//! # Overview
//!
//! - [`search`]: rate-limited Brave API client, result formatting, and the
//!   two-stage local search with web-search fallback
//! - [`tools`]: schema-validated tool registry
//! - [`gateway`]: JSON-RPC dispatch and SSE session transport
//! - [`observability`]: structured logging, metrics, and health endpoints
//!
//! # Quick Start
//!
//! ```rust
//! use brave_search_mcp::search::{RateLimiter, RateLimits, SearchOrchestrator};
//! use brave_search_mcp::testing::MockSearchBackend;
//! use brave_search_mcp::tools::ToolSystem;
//! use std::sync::Arc;
//!
//! let limiter = RateLimiter::new(RateLimits::default());
//! assert_eq!(limiter.snapshot().month_remaining(), 15_000);
//!
//! let orchestrator = SearchOrchestrator::new(Arc::new(MockSearchBackend::new()));
//! let tools = ToolSystem::with_search(orchestrator);
//! assert_eq!(tools.list_tools().len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod search;
pub mod testing;
pub mod tools;

pub use config::{ConfigError, ServerConfig};
pub use error::{SearchError, SearchResult};
pub use search::{SearchBackend, SearchOrchestrator};
pub use tools::{Tool, ToolDescription, ToolError, ToolSystem};
