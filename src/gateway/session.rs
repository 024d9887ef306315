//! SSE session registry
//!
//! Each `GET /sse` connection owns one unbounded channel. POSTed messages for
//! that session are answered by pushing serialized responses into the
//! channel; the SSE stream drains it. Dropping the stream (client disconnect)
//! unregisters the session.

use crate::gateway::jsonrpc::JsonRpcResponse;
use crate::gateway::GatewayError;
use crate::observability::metrics::metrics;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::Stream;
use tracing::info;
use uuid::Uuid;

type SessionMap = HashMap<String, UnboundedSender<String>>;

/// Live sessions keyed by session id
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<SessionMap>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and return its id with the outbound stream
    pub fn open(&self) -> (String, SessionStream) {
        let id = Uuid::new_v4().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();

        self.write().insert(id.clone(), sender);
        metrics().session_opened();
        info!(session_id = %id, "SSE session opened");

        let stream = SessionStream {
            receiver,
            guard: SessionGuard {
                id: id.clone(),
                registry: self.clone(),
            },
        };
        (id, stream)
    }

    /// Queue a response for delivery on the session's SSE stream
    pub fn send(&self, id: &str, response: &JsonRpcResponse) -> Result<(), GatewayError> {
        let payload = serde_json::to_string(response)?;
        let sessions = self.read();
        let sender = sessions
            .get(id)
            .ok_or_else(|| GatewayError::UnknownSession(id.to_string()))?;
        sender
            .send(payload)
            .map_err(|_| GatewayError::SessionClosed(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.read().len()
    }

    /// Drop every sender so all open streams end
    pub fn close_all(&self) {
        let mut sessions = self.write();
        if !sessions.is_empty() {
            info!(count = sessions.len(), "Closing all SSE sessions");
        }
        sessions.clear();
    }

    fn remove(&self, id: &str) {
        self.write().remove(id);
    }

    // The map holds only senders; a panic mid-insert cannot leave it inconsistent.
    fn read(&self) -> RwLockReadGuard<'_, SessionMap> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionMap> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unregisters its session when dropped
#[derive(Debug)]
struct SessionGuard {
    id: String,
    registry: SessionRegistry,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
        metrics().session_closed();
        info!(session_id = %self.id, "SSE session closed");
    }
}

/// Serialized JSON-RPC responses for one session
#[derive(Debug)]
pub struct SessionStream {
    receiver: UnboundedReceiver<String>,
    guard: SessionGuard,
}

impl SessionStream {
    pub fn session_id(&self) -> &str {
        &self.guard.id
    }
}

impl Stream for SessionStream {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
