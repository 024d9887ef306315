//! MCP gateway over HTTP + Server-Sent Events
//!
//! A client opens `GET /sse`, receives an `endpoint` event naming its
//! session-scoped POST URL, then sends JSON-RPC messages there. Responses
//! come back asynchronously as `message` events on the stream.

pub mod handler;
pub mod jsonrpc;
pub mod server;
pub mod session;

pub use handler::{McpHandler, ServerInfo, DEFAULT_PROTOCOL_VERSION};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::GatewayServer;
pub use session::{SessionRegistry, SessionStream};

use std::net::SocketAddr;
use thiserror::Error;

/// Gateway transport errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No transport found for sessionId {0}")]
    UnknownSession(String),
    #[error("Session {0} is closed")]
    SessionClosed(String),
    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },
}
