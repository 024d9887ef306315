//! Search orchestration core
//!
//! Layers, leaves first:
//! - [`rate_limit`]: process-wide quota gating every outbound call
//! - [`client`]: the three Brave API request shapes behind [`SearchBackend`]
//! - [`format`]: text rendering of web and local results
//! - [`orchestrator`]: the web and local search use cases, including the
//!   two-stage local protocol and its fallback to web search

pub mod client;
pub mod format;
pub mod orchestrator;
pub mod rate_limit;
pub mod types;

pub use client::{
    clamp_count, BraveClient, BraveClientConfig, Operation, SearchBackend, WebSearchParams,
    DEFAULT_BASE_URL, MAX_RESULT_COUNT,
};
pub use format::{format_local_results, format_web_results};
pub use orchestrator::{SearchOrchestrator, DEFAULT_LOCAL_COUNT, DEFAULT_WEB_COUNT};
pub use rate_limit::{Clock, QuotaSnapshot, RateLimiter, RateLimits, SystemClock};
pub use types::{DescriptionMap, LocationRef, Poi, PoiAddress, PoiRating, WebResult, WebSearchPage};
