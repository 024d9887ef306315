//! Process-wide request quota
//!
//! Brave subscriptions are metered per second and per month. One
//! [`RateLimiter`] is shared by every outbound call; the per-second window is
//! reset lazily by the first call that observes it has expired, and the
//! monthly counter is only bounded by its ceiling.

use crate::error::{SearchError, SearchResult};
use crate::observability::metrics::metrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

/// Length of the short quota window
pub const SECOND_WINDOW: Duration = Duration::from_millis(1000);

/// Time source for the limiter
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Configured quota ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    #[serde(default = "default_per_second")]
    pub per_second: u32,
    #[serde(default = "default_per_month")]
    pub per_month: u32,
}

fn default_per_second() -> u32 {
    1
}

fn default_per_month() -> u32 {
    15_000
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            per_second: default_per_second(),
            per_month: default_per_month(),
        }
    }
}

#[derive(Debug)]
struct QuotaState {
    second_count: u32,
    month_count: u32,
    window_start: Instant,
}

/// Point-in-time view of the quota counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    pub second_count: u32,
    pub month_count: u32,
    pub per_second: u32,
    pub per_month: u32,
}

impl QuotaSnapshot {
    pub fn month_exhausted(&self) -> bool {
        self.month_count >= self.per_month
    }

    pub fn month_remaining(&self) -> u32 {
        self.per_month.saturating_sub(self.month_count)
    }
}

/// Shared quota accounting for all Brave API calls
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimits,
    clock: Arc<dyn Clock>,
    state: Mutex<QuotaState>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: RateLimits, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now();
        Self {
            limits,
            clock,
            state: Mutex::new(QuotaState {
                second_count: 0,
                month_count: 0,
                window_start,
            }),
        }
    }

    pub fn limits(&self) -> RateLimits {
        self.limits
    }

    /// Consume one unit of quota, or fail without consuming anything
    ///
    /// Must be called exactly once per outbound request, before the request
    /// is built.
    pub fn check_and_consume(&self) -> SearchResult<()> {
        let now = self.clock.now();
        let mut state = self.lock_state();

        Self::reset_expired_window(&mut state, now);

        if Self::is_exhausted(&state, &self.limits) {
            let (second_count, month_count) = (state.second_count, state.month_count);
            drop(state);

            warn!(
                second_count,
                month_count,
                per_second = self.limits.per_second,
                per_month = self.limits.per_month,
                "Rate limit exceeded"
            );
            metrics().rate_limit_rejected();
            return Err(SearchError::RateLimitExceeded);
        }

        state.second_count += 1;
        state.month_count += 1;
        Ok(())
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        let state = self.lock_state();
        QuotaSnapshot {
            second_count: state.second_count,
            month_count: state.month_count,
            per_second: self.limits.per_second,
            per_month: self.limits.per_month,
        }
    }

    /// Start a fresh second window once more than [`SECOND_WINDOW`] has elapsed (pure function)
    fn reset_expired_window(state: &mut QuotaState, now: Instant) {
        if now.saturating_duration_since(state.window_start) > SECOND_WINDOW {
            state.second_count = 0;
            state.window_start = now;
        }
    }

    /// Check both ceilings (pure function)
    fn is_exhausted(state: &QuotaState, limits: &RateLimits) -> bool {
        state.second_count >= limits.per_second || state.month_count >= limits.per_month
    }

    // Counters stay consistent even if a holder panicked: every mutation is a
    // single increment performed after the checks.
    fn lock_state(&self) -> MutexGuard<'_, QuotaState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
