//! Observability: structured logging, metrics collection, and health endpoints

pub mod health;
pub mod logging;
pub mod metrics;

// Re-export for convenience
pub use health::{HealthCheck, HealthService, HealthStatus};
pub use logging::{init_default_logging, init_logging, LogFormat};
pub use metrics::{metrics, FallbackReason, MetricsCollector, MetricsSnapshot};

// Span macros for structured logging
pub use logging::{search_span, session_span, tool_span};
