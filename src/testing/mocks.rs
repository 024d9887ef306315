//! Mock implementations for testing
//!
//! Provides a manually driven clock and an in-memory search backend so the
//! limiter, orchestrator and tool layers can be exercised without the network.

use crate::error::SearchResult;
use crate::search::client::{SearchBackend, WebSearchParams};
use crate::search::rate_limit::Clock;
use crate::search::types::{DescriptionMap, Poi, WebSearchPage};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One recorded backend invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    WebSearch(WebSearchParams),
    Pois(Vec<String>),
    Descriptions(Vec<String>),
}

/// Scripted search backend
///
/// Location-filtered web searches answer with the location page, all other
/// web searches with the web page. Unconfigured calls succeed with empty data.
#[derive(Debug)]
pub struct MockSearchBackend {
    web: SearchResult<WebSearchPage>,
    locations: SearchResult<WebSearchPage>,
    pois: SearchResult<Vec<Poi>>,
    descriptions: SearchResult<DescriptionMap>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockSearchBackend {
    fn default() -> Self {
        Self {
            web: Ok(WebSearchPage::default()),
            locations: Ok(WebSearchPage::default()),
            pois: Ok(Vec::new()),
            descriptions: Ok(DescriptionMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockSearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_web_page(mut self, page: WebSearchPage) -> Self {
        self.web = Ok(page);
        self
    }

    pub fn with_web_error(mut self, error: crate::error::SearchError) -> Self {
        self.web = Err(error);
        self
    }

    pub fn with_location_page(mut self, page: WebSearchPage) -> Self {
        self.locations = Ok(page);
        self
    }

    pub fn with_location_error(mut self, error: crate::error::SearchError) -> Self {
        self.locations = Err(error);
        self
    }

    pub fn with_pois(mut self, pois: Vec<Poi>) -> Self {
        self.pois = Ok(pois);
        self
    }

    pub fn with_pois_error(mut self, error: crate::error::SearchError) -> Self {
        self.pois = Err(error);
        self
    }

    pub fn with_descriptions(mut self, entries: &[(&str, &str)]) -> Self {
        self.descriptions = Ok(entries
            .iter()
            .map(|(id, text)| (id.to_string(), text.to_string()))
            .collect());
        self
    }

    pub fn with_descriptions_error(mut self, error: crate::error::SearchError) -> Self {
        self.descriptions = Err(error);
        self
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: MockCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn web_search(&self, params: &WebSearchParams) -> SearchResult<WebSearchPage> {
        self.record(MockCall::WebSearch(params.clone()));
        if params.result_filter.is_some() {
            self.locations.clone()
        } else {
            self.web.clone()
        }
    }

    async fn pois(&self, ids: &[String]) -> SearchResult<Vec<Poi>> {
        self.record(MockCall::Pois(ids.to_vec()));
        self.pois.clone()
    }

    async fn descriptions(&self, ids: &[String]) -> SearchResult<DescriptionMap> {
        self.record(MockCall::Descriptions(ids.to_vec()));
        self.descriptions.clone()
    }
}
