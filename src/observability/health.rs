//! Health check HTTP endpoints
//!
//! Provides HTTP endpoints for monitoring server status, supporting both
//! human operators and container orchestration platforms. The filters are
//! mounted on the same listener as the MCP gateway.

use crate::observability::metrics::metrics;
use crate::search::rate_limit::RateLimiter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use warp::http::StatusCode;
use warp::Filter;

/// Health reporting for the search server
#[derive(Debug)]
pub struct HealthService {
    server_name: String,
    version: String,
    limiter: Arc<RateLimiter>,
}

impl HealthService {
    pub fn new(
        server_name: impl Into<String>,
        version: impl Into<String>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            version: version.into(),
            limiter,
        }
    }

    /// Health, liveness, metrics and index routes
    pub fn routes(
        self: Arc<Self>,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let health_service = self.clone();

        // GET /health - quota and session status
        let health_route = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and_then(move || {
                let service = health_service.clone();
                async move {
                    let status = service.health_status();
                    let code = if status.status == HEALTHY {
                        StatusCode::OK
                    } else {
                        StatusCode::SERVICE_UNAVAILABLE
                    };
                    Ok::<_, Infallible>(warp::reply::with_status(
                        warp::reply::json(&status),
                        code,
                    ))
                }
            });

        // GET /metrics - complete metrics export
        let metrics_route = warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| warp::reply::json(&metrics().get_metrics()));

        // GET /live - liveness probe
        let live_route = warp::path("live")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| {
                warp::reply::json(&LivenessResponse {
                    alive: true,
                    timestamp: current_timestamp(),
                })
            });

        // GET / - endpoint index
        let root_route = warp::path::end().and(warp::get()).map(|| {
            let endpoints = [
                ("/sse", "MCP event stream; announces the session endpoint"),
                ("/messages", "MCP JSON-RPC messages for an open session"),
                ("/health", "Overall health status with detailed checks"),
                ("/metrics", "Comprehensive metrics and statistics"),
                ("/live", "Liveness probe"),
            ]
            .into_iter()
            .map(|(path, text)| (path.to_string(), text.to_string()))
            .collect();

            warp::reply::json(&ApiDocumentationResponse { endpoints })
        });

        health_route.or(metrics_route).or(live_route).or(root_route)
    }

    /// Assemble the current health report
    pub fn health_status(&self) -> HealthStatus {
        let now = current_timestamp();
        let snapshot = metrics().get_metrics();

        let mut checks = BTreeMap::new();
        checks.insert("brave_quota".to_string(), self.check_quota(now));
        checks.insert(
            "sessions".to_string(),
            HealthCheck {
                status: HEALTHY.to_string(),
                message: Some(format!("{} active sessions", snapshot.sessions.active)),
                last_check: now,
            },
        );

        let overall_healthy = checks.values().all(|check| check.status == HEALTHY);

        HealthStatus {
            status: if overall_healthy { HEALTHY } else { DEGRADED }.to_string(),
            timestamp: now,
            server: self.server_name.clone(),
            version: self.version.clone(),
            uptime_seconds: snapshot.lifecycle.uptime_seconds,
            checks,
        }
    }

    fn check_quota(&self, now: u64) -> HealthCheck {
        let quota = self.limiter.snapshot();

        if quota.month_exhausted() {
            HealthCheck {
                status: "exhausted".to_string(),
                message: Some(format!(
                    "Monthly quota of {} requests used up",
                    quota.per_month
                )),
                last_check: now,
            }
        } else {
            HealthCheck {
                status: HEALTHY.to_string(),
                message: Some(format!(
                    "{} of {} monthly requests remaining",
                    quota.month_remaining(),
                    quota.per_month
                )),
                last_check: now,
            }
        }
    }
}

const HEALTHY: &str = "healthy";
const DEGRADED: &str = "degraded";

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: Option<String>,
    pub last_check: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: u64,
    pub server: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: BTreeMap<String, HealthCheck>,
}

#[derive(Debug, Serialize)]
struct LivenessResponse {
    alive: bool,
    timestamp: u64,
}

#[derive(Debug, Serialize)]
struct ApiDocumentationResponse {
    endpoints: BTreeMap<String, String>,
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
