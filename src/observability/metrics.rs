//! Thread-safe metrics collection system
//!
//! Provides atomic counters and mutex-protected collections for tracking
//! operational statistics across upstream calls, quota, sessions, and tools.

use crate::search::client::Operation;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Global metrics collector instance
pub static METRICS: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Get reference to global metrics collector
pub fn metrics() -> &'static MetricsCollector {
    &METRICS
}

const MAX_TIMING_SAMPLES: usize = 1000;

/// Why a local search degraded to a web search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Resolution returned no location ids
    NoLocations,
    /// POI or description retrieval failed
    DetailFailure,
}

/// Thread-safe metrics collector using atomics and mutexes
pub struct MetricsCollector {
    // Upstream API metrics (atomic for high frequency)
    upstream_requests: AtomicU64,
    upstream_failures: AtomicU64,
    rate_limited: AtomicU64,

    // Per-operation counters (mutex protected for complex data)
    operation_stats: Mutex<HashMap<&'static str, OperationCounts>>,

    // Local search fallbacks
    fallback_no_locations: AtomicU64,
    fallback_detail_failure: AtomicU64,

    // Session metrics
    sessions_opened: AtomicU64,
    sessions_closed: AtomicU64,

    // Tool statistics (mutex protected for complex data)
    tool_stats: Mutex<HashMap<String, ToolExecutionStats>>,

    // Lifecycle metrics
    server_state: Mutex<String>,
    uptime_start: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            upstream_requests: AtomicU64::new(0),
            upstream_failures: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            operation_stats: Mutex::new(HashMap::new()),
            fallback_no_locations: AtomicU64::new(0),
            fallback_detail_failure: AtomicU64::new(0),
            sessions_opened: AtomicU64::new(0),
            sessions_closed: AtomicU64::new(0),
            tool_stats: Mutex::new(HashMap::new()),
            server_state: Mutex::new("initializing".to_string()),
            uptime_start: AtomicU64::new(current_timestamp()),
        }
    }

    // Upstream metrics
    pub fn upstream_request(&self, operation: Operation) {
        self.upstream_requests.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut stats) = self.operation_stats.lock() {
            stats.entry(operation.as_str()).or_default().requests += 1;
        }
    }

    pub fn upstream_failed(&self, operation: Operation) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut stats) = self.operation_stats.lock() {
            stats.entry(operation.as_str()).or_default().failures += 1;
        }
    }

    pub fn rate_limit_rejected(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn local_search_fallback(&self, reason: FallbackReason) {
        let counter = match reason {
            FallbackReason::NoLocations => &self.fallback_no_locations,
            FallbackReason::DetailFailure => &self.fallback_detail_failure,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // Session metrics
    pub fn session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_closed(&self) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Create or retrieve tool stats entry (pure function)
    fn get_or_create_tool_stats<'a>(
        stats: &'a mut HashMap<String, ToolExecutionStats>,
        tool_name: &str,
    ) -> &'a mut ToolExecutionStats {
        stats
            .entry(tool_name.to_string())
            .or_insert_with(|| ToolExecutionStats {
                name: tool_name.to_string(),
                executions: 0,
                failures: 0,
                execution_times: Vec::new(),
                last_execution: 0,
            })
    }

    /// Update tool execution statistics (pure function)
    fn update_tool_execution_stats(
        tool_stats: &mut ToolExecutionStats,
        duration: Duration,
        success: bool,
    ) {
        tool_stats.executions += 1;
        tool_stats.last_execution = current_timestamp();
        tool_stats.execution_times.push(duration.as_millis() as u64);

        if tool_stats.execution_times.len() > MAX_TIMING_SAMPLES {
            tool_stats.execution_times.remove(0);
        }

        if !success {
            tool_stats.failures += 1;
        }
    }

    // Tool execution metrics
    pub fn tool_executed(&self, tool_name: &str, duration: Duration, success: bool) {
        if let Ok(mut stats) = self.tool_stats.lock() {
            let tool_stats = Self::get_or_create_tool_stats(&mut stats, tool_name);
            Self::update_tool_execution_stats(tool_stats, duration, success);
        }
    }

    // Lifecycle metrics
    pub fn set_server_state(&self, state: &str) {
        if let Ok(mut current_state) = self.server_state.lock() {
            if *current_state != state {
                *current_state = state.to_string();
            }
        }
    }

    /// Build tool statistics summary (pure function)
    fn build_tool_metrics(&self) -> ToolMetrics {
        let Ok(stats) = self.tool_stats.lock() else {
            return ToolMetrics::default();
        };

        let mut tool_stats = HashMap::new();
        let mut all_times = Vec::new();
        let mut total_executions = 0u64;
        let mut total_failures = 0u64;

        for (name, stats) in stats.iter() {
            tool_stats.insert(name.clone(), Self::create_tool_snapshot(stats));
            total_executions += stats.executions;
            total_failures += stats.failures;
            all_times.extend_from_slice(&stats.execution_times);
        }

        all_times.sort_unstable();
        let avg_execution_time_ms = if all_times.is_empty() {
            0.0
        } else {
            all_times.iter().sum::<u64>() as f64 / all_times.len() as f64
        };

        ToolMetrics {
            tool_stats,
            total_executions,
            total_failures,
            avg_execution_time_ms,
            execution_time_p50_ms: percentile(&all_times, 50.0),
            execution_time_p95_ms: percentile(&all_times, 95.0),
        }
    }

    /// Create tool execution snapshot (pure function)
    fn create_tool_snapshot(stats: &ToolExecutionStats) -> ToolExecutionStatsSnapshot {
        let avg_execution_time = if stats.execution_times.is_empty() {
            0.0
        } else {
            stats.execution_times.iter().sum::<u64>() as f64 / stats.execution_times.len() as f64
        };

        let success_rate = if stats.executions == 0 {
            0.0
        } else {
            (stats.executions - stats.failures) as f64 / stats.executions as f64
        };

        ToolExecutionStatsSnapshot {
            name: stats.name.clone(),
            executions: stats.executions,
            failures: stats.failures,
            avg_execution_time_ms: avg_execution_time,
            last_execution: stats.last_execution,
            success_rate,
        }
    }

    fn build_upstream_metrics(&self) -> UpstreamMetrics {
        let by_operation = self
            .operation_stats
            .lock()
            .map(|stats| {
                stats
                    .iter()
                    .map(|(name, counts)| (name.to_string(), *counts))
                    .collect()
            })
            .unwrap_or_default();

        UpstreamMetrics {
            requests: self.upstream_requests.load(Ordering::Relaxed),
            failures: self.upstream_failures.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            by_operation,
        }
    }

    /// Get current server state (pure function)
    fn get_current_server_state(&self) -> String {
        self.server_state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Get complete metrics snapshot
    pub fn get_metrics(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        let opened = self.sessions_opened.load(Ordering::Relaxed);
        let closed = self.sessions_closed.load(Ordering::Relaxed);

        MetricsSnapshot {
            upstream: self.build_upstream_metrics(),
            local_search: LocalSearchMetrics {
                fallback_no_locations: self.fallback_no_locations.load(Ordering::Relaxed),
                fallback_detail_failure: self.fallback_detail_failure.load(Ordering::Relaxed),
            },
            sessions: SessionMetrics {
                opened,
                closed,
                active: opened.saturating_sub(closed),
            },
            tools: self.build_tool_metrics(),
            lifecycle: LifecycleMetrics {
                current_state: self.get_current_server_state(),
                uptime_seconds: now.saturating_sub(self.uptime_start.load(Ordering::Relaxed)),
            },
            timestamp: now,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

// Internal tool statistics (with timing data)
#[derive(Debug)]
struct ToolExecutionStats {
    name: String,
    executions: u64,
    failures: u64,
    execution_times: Vec<u64>, // milliseconds
    last_execution: u64,
}

// Public metrics structures
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub upstream: UpstreamMetrics,
    pub local_search: LocalSearchMetrics,
    pub sessions: SessionMetrics,
    pub tools: ToolMetrics,
    pub lifecycle: LifecycleMetrics,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationCounts {
    pub requests: u64,
    pub failures: u64,
}

#[derive(Debug, Serialize)]
pub struct UpstreamMetrics {
    pub requests: u64,
    pub failures: u64,
    pub rate_limited: u64,
    pub by_operation: HashMap<String, OperationCounts>,
}

#[derive(Debug, Serialize)]
pub struct LocalSearchMetrics {
    pub fallback_no_locations: u64,
    pub fallback_detail_failure: u64,
}

#[derive(Debug, Serialize)]
pub struct SessionMetrics {
    pub opened: u64,
    pub closed: u64,
    pub active: u64,
}

#[derive(Debug, Default, Serialize)]
pub struct ToolMetrics {
    pub tool_stats: HashMap<String, ToolExecutionStatsSnapshot>,
    pub total_executions: u64,
    pub total_failures: u64,
    pub avg_execution_time_ms: f64,
    pub execution_time_p50_ms: f64,
    pub execution_time_p95_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct ToolExecutionStatsSnapshot {
    pub name: String,
    pub executions: u64,
    pub failures: u64,
    pub avg_execution_time_ms: f64,
    pub last_execution: u64,
    pub success_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct LifecycleMetrics {
    pub current_state: String,
    pub uptime_seconds: u64,
}

// Helper functions
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn percentile(sorted_data: &[u64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }

    let len = sorted_data.len();
    let index = (percentile / 100.0) * (len - 1) as f64;

    if index.fract() == 0.0 {
        sorted_data[index as usize] as f64
    } else {
        let lower_index = index.floor() as usize;
        let upper_index = index.ceil() as usize;
        let lower_value = sorted_data[lower_index] as f64;
        let upper_value = sorted_data[upper_index] as f64;

        lower_value + (upper_value - lower_value) * index.fract()
    }
}
