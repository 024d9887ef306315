//! HTTP surface: SSE session stream, message intake, and health routes

use crate::gateway::handler::McpHandler;
use crate::gateway::jsonrpc::{parse_request, JsonRpcResponse};
use crate::gateway::session::SessionRegistry;
use crate::gateway::GatewayError;
use crate::observability::health::HealthService;
use crate::observability::metrics::metrics;
use crate::session_span;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing::{info, warn, Instrument};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::sse::Event;
use warp::{Filter, Reply};

pub const SSE_PATH: &str = "sse";
pub const MESSAGES_PATH: &str = "messages";

const SESSION_QUERY_KEY: &str = "sessionId";
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);
const MAX_MESSAGE_BYTES: u64 = 4 * 1024 * 1024;

/// MCP-over-SSE server
pub struct GatewayServer {
    handler: Arc<McpHandler>,
    sessions: SessionRegistry,
    health: Arc<HealthService>,
}

impl GatewayServer {
    pub fn new(handler: McpHandler, health: HealthService) -> Self {
        Self {
            handler: Arc::new(handler),
            sessions: SessionRegistry::new(),
            health: Arc::new(health),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// All routes served by the gateway
    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let sse_sessions = self.sessions.clone();

        // GET /sse - open a session and stream its responses
        let sse_route = warp::path(SSE_PATH)
            .and(warp::path::end())
            .and(warp::get())
            .map(move || {
                let (session_id, stream) = sse_sessions.open();
                let endpoint = format!("/{MESSAGES_PATH}?{SESSION_QUERY_KEY}={session_id}");

                let events = tokio_stream::once(Ok::<_, Infallible>(
                    Event::default().event("endpoint").data(endpoint),
                ))
                .chain(
                    stream.map(|payload| Ok(Event::default().event("message").data(payload))),
                );

                warp::sse::reply(
                    warp::sse::keep_alive()
                        .interval(KEEP_ALIVE_INTERVAL)
                        .stream(events),
                )
            });

        let handler = self.handler.clone();
        let message_sessions = self.sessions.clone();

        // POST /messages?sessionId=<id> - JSON-RPC intake
        let messages_route = warp::path(MESSAGES_PATH)
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::body::content_length_limit(MAX_MESSAGE_BYTES))
            .and(warp::body::bytes())
            .map(move |query: HashMap<String, String>, body: Bytes| {
                accept_message(
                    &handler,
                    &message_sessions,
                    query.get(SESSION_QUERY_KEY).map(String::as_str),
                    &body,
                )
            });

        sse_route
            .or(messages_route)
            .or(self.health.clone().routes())
            .with(
                warp::cors()
                    .allow_any_origin()
                    .allow_methods(vec!["GET", "POST"])
                    .allow_headers(vec!["content-type"]),
            )
    }

    /// Serve until `shutdown` resolves, then end every open session
    pub async fn run(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), GatewayError> {
        let sessions = self.sessions.clone();
        let signal = async move {
            shutdown.await;
            info!("Shutdown requested, closing sessions");
            sessions.close_all();
        };

        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, signal)
            .map_err(|e| GatewayError::Bind {
                addr,
                message: e.to_string(),
            })?;

        metrics().set_server_state("running");
        info!(address = %bound, "Brave Search MCP Server running at http://{bound}");

        server.await;

        metrics().set_server_state("stopped");
        info!("Server stopped");
        Ok(())
    }
}

/// Route one POSTed message to its session (impure: spawns the handling task)
fn accept_message(
    handler: &Arc<McpHandler>,
    sessions: &SessionRegistry,
    session_id: Option<&str>,
    body: &[u8],
) -> warp::reply::Response {
    let Some(session_id) = session_id.filter(|id| sessions.contains(id)) else {
        warn!(session_id = ?session_id, "Message for unknown session");
        return json_reply(
            &json!({
                "success": false,
                "error": {"message": "No transport found for sessionId"}
            }),
            StatusCode::BAD_REQUEST,
        );
    };

    let request = match parse_request(body) {
        Ok(request) => request,
        Err(error) => {
            warn!(session_id, code = error.code, "Rejected malformed message");
            return json_reply(
                &JsonRpcResponse::failure(Value::Null, error),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let handler = handler.clone();
    let sessions = sessions.clone();
    let session_id = session_id.to_string();
    let span = session_span!(session_id = %session_id, method = %request.method);

    tokio::spawn(
        async move {
            let Some(response) = handler.handle(request).await else {
                return;
            };
            if let Err(error) = sessions.send(&session_id, &response) {
                warn!(error = %error, "Dropping response for closed session");
            }
        }
        .instrument(span),
    );

    warp::reply::with_status("Accepted", StatusCode::ACCEPTED).into_response()
}

fn json_reply<T: serde::Serialize>(body: &T, status: StatusCode) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}
