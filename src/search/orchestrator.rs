//! Web and local search use cases
//!
//! Local search is a two-stage protocol:
//! 1. resolve the query to location ids with a location-filtered web search
//! 2. fetch POI details and descriptions for those ids concurrently
//!
//! When stage one finds nothing, or either stage-two call fails, the result
//! silently degrades to a general web search for the same query and count.

use crate::error::SearchResult;
use crate::observability::metrics::{metrics, FallbackReason};
use crate::search::client::{SearchBackend, WebSearchParams};
use crate::search::format::{format_local_results, format_web_results};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_WEB_COUNT: u32 = 10;
pub const DEFAULT_LOCAL_COUNT: u32 = 5;

/// Entry point for both search tools
#[derive(Clone)]
pub struct SearchOrchestrator {
    backend: Arc<dyn SearchBackend>,
}

impl SearchOrchestrator {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// General web search; every failure propagates
    pub async fn web_search(&self, query: &str, count: u32, offset: u32) -> SearchResult<String> {
        let page = self
            .backend
            .web_search(&WebSearchParams::web(query, count, offset))
            .await?;
        Ok(format_web_results(&page.results))
    }

    /// Local business search with fallback to web search
    ///
    /// A failure of the resolution call propagates; detail-stage failures are
    /// logged and masked by the fallback. A failing fallback propagates.
    pub async fn local_search(&self, query: &str, count: u32) -> SearchResult<String> {
        let page = self
            .backend
            .web_search(&WebSearchParams::locations(query, count))
            .await?;
        let location_ids = page.location_ids();

        if location_ids.is_empty() {
            info!(
                query,
                "No local results found for query, falling back to web search"
            );
            metrics().local_search_fallback(FallbackReason::NoLocations);
            return self.web_search(query, count, 0).await;
        }

        // Both calls settle before branching, so neither outcome is discarded
        // while the other is still in flight.
        let (pois, descriptions) = tokio::join!(
            self.backend.pois(&location_ids),
            self.backend.descriptions(&location_ids)
        );

        match (pois, descriptions) {
            (Ok(pois), Ok(descriptions)) => Ok(format_local_results(&pois, &descriptions)),
            (pois, descriptions) => {
                for error in [pois.err(), descriptions.err()].into_iter().flatten() {
                    warn!(
                        query,
                        error = %error,
                        "Error fetching POI/Description data, falling back to web search"
                    );
                }
                metrics().local_search_fallback(FallbackReason::DetailFailure);
                self.web_search(query, count, 0).await
            }
        }
    }
}
