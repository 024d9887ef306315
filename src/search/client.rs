//! Brave Search API client
//!
//! The three endpoints the server uses share one request primitive
//! ([`BraveClient::get_json`]): consume quota, attach the subscription token,
//! map non-success statuses to [`SearchError::Upstream`] and parse the body.
//! Each public operation is a thin specialization over it.

use crate::error::{SearchError, SearchResult};
use crate::observability::metrics::metrics;
use crate::search::rate_limit::RateLimiter;
use crate::search_span;
use crate::search::types::{
    DescriptionMap, DescriptionsResponse, Poi, PoiResponse, WebSearchPage, WebSearchResponse,
};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn, Instrument};
use url::Url;

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/res/v1/";

/// Upstream ceiling on results per request
pub const MAX_RESULT_COUNT: u32 = 20;

const SUBSCRIPTION_TOKEN_HEADER: &str = "X-Subscription-Token";
const LOCAL_SEARCH_LANG: &str = "en";
const LOCATIONS_FILTER: &str = "locations";

/// Outbound request shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// General web search
    WebSearch,
    /// Web search restricted to location results (local search stage one)
    LocalResolve,
    /// Point-of-interest details
    Pois,
    /// Point-of-interest descriptions
    Descriptions,
}

impl Operation {
    /// Endpoint path relative to the API root
    pub fn path(&self) -> &'static str {
        match self {
            Self::WebSearch | Self::LocalResolve => "web/search",
            Self::Pois => "local/pois",
            Self::Descriptions => "local/descriptions",
        }
    }

    /// Stable identifier used in metrics and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::LocalResolve => "local_resolve",
            Self::Pois => "local_pois",
            Self::Descriptions => "local_descriptions",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::WebSearch => "Web Search",
            Self::LocalResolve => "Local Initial",
            Self::Pois => "POI",
            Self::Descriptions => "Descriptions",
        };
        f.write_str(label)
    }
}

/// Clamp a requested result count to the upstream maximum
pub fn clamp_count(count: u32) -> u32 {
    count.min(MAX_RESULT_COUNT)
}

/// Parameters of a `web/search` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSearchParams {
    pub query: String,
    pub count: u32,
    pub offset: Option<u32>,
    pub search_lang: Option<String>,
    pub result_filter: Option<String>,
}

impl WebSearchParams {
    /// General web search
    pub fn web(query: impl Into<String>, count: u32, offset: u32) -> Self {
        Self {
            query: query.into(),
            count,
            offset: Some(offset),
            search_lang: None,
            result_filter: None,
        }
    }

    /// Location-only search used to resolve local search ids
    pub fn locations(query: impl Into<String>, count: u32) -> Self {
        Self {
            query: query.into(),
            count,
            offset: None,
            search_lang: Some(LOCAL_SEARCH_LANG.to_string()),
            result_filter: Some(LOCATIONS_FILTER.to_string()),
        }
    }

    pub fn operation(&self) -> Operation {
        if self.result_filter.is_some() {
            Operation::LocalResolve
        } else {
            Operation::WebSearch
        }
    }

    /// Build query string pairs, clamping `count` (pure function)
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("q", self.query.clone()),
            ("count", clamp_count(self.count).to_string()),
        ];
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(lang) = &self.search_lang {
            pairs.push(("search_lang", lang.clone()));
        }
        if let Some(filter) = &self.result_filter {
            pairs.push(("result_filter", filter.clone()));
        }
        pairs
    }
}

/// Build repeated `ids` pairs, dropping empty ids (pure function)
pub fn id_query_pairs(ids: &[String]) -> Vec<(&'static str, String)> {
    ids.iter()
        .filter(|id| !id.is_empty())
        .map(|id| ("ids", id.clone()))
        .collect()
}

/// The search operations the orchestrator depends on
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn web_search(&self, params: &WebSearchParams) -> SearchResult<WebSearchPage>;

    async fn pois(&self, ids: &[String]) -> SearchResult<Vec<Poi>>;

    async fn descriptions(&self, ids: &[String]) -> SearchResult<DescriptionMap>;
}

/// Brave client configuration
#[derive(Clone)]
pub struct BraveClientConfig {
    pub api_key: String,
    pub base_url: Url,
    pub timeout: Duration,
}

impl fmt::Debug for BraveClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraveClientConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BraveClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            // DEFAULT_BASE_URL is a constant, known-good URL
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Brave Search API
pub struct BraveClient {
    config: BraveClientConfig,
    http: Client,
    limiter: Arc<RateLimiter>,
}

impl BraveClient {
    pub fn new(config: BraveClientConfig, limiter: Arc<RateLimiter>) -> SearchResult<Self> {
        // The gzip feature adds `Accept-Encoding: gzip` and decodes responses.
        let http = Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| SearchError::client_init(e.to_string()))?;

        Ok(Self {
            config,
            http,
            limiter,
        })
    }

    fn endpoint(&self, operation: Operation) -> SearchResult<Url> {
        self.config
            .base_url
            .join(operation.path())
            .map_err(|e| SearchError::client_init(format!("invalid endpoint URL: {e}")))
    }

    /// Shared request primitive for every Brave endpoint (impure I/O)
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        query: &[(&'static str, String)],
    ) -> SearchResult<T> {
        self.limiter.check_and_consume()?;

        let url = self.endpoint(operation)?;
        let collector = metrics();
        collector.upstream_request(operation);
        debug!(operation = operation.as_str(), %url, "Sending Brave API request");

        let response = self
            .http
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .header(SUBSCRIPTION_TOKEN_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                collector.upstream_failed(operation);
                SearchError::network(operation, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(
                        operation = operation.as_str(),
                        error = %e,
                        "Failed to read error response body"
                    );
                    String::new()
                }
            };
            collector.upstream_failed(operation);
            warn!(
                operation = operation.as_str(),
                status = status.as_u16(),
                "Brave API returned non-success status"
            );
            return Err(SearchError::upstream(operation, status.as_u16(), body));
        }

        let body = response.text().await.map_err(|e| {
            collector.upstream_failed(operation);
            SearchError::network(operation, e.to_string())
        })?;

        serde_json::from_str(&body).map_err(|e| {
            collector.upstream_failed(operation);
            SearchError::malformed_response(operation, e.to_string())
        })
    }
}

#[async_trait]
impl SearchBackend for BraveClient {
    async fn web_search(&self, params: &WebSearchParams) -> SearchResult<WebSearchPage> {
        let operation = params.operation();
        let response: WebSearchResponse = self
            .get_json(operation, &params.query_pairs())
            .instrument(search_span!(operation = operation.as_str(), count = params.count))
            .await?;
        Ok(response.into())
    }

    async fn pois(&self, ids: &[String]) -> SearchResult<Vec<Poi>> {
        let response: PoiResponse = self
            .get_json(Operation::Pois, &id_query_pairs(ids))
            .instrument(search_span!(operation = Operation::Pois.as_str(), ids = ids.len()))
            .await?;
        Ok(response.results)
    }

    async fn descriptions(&self, ids: &[String]) -> SearchResult<DescriptionMap> {
        let response: DescriptionsResponse = self
            .get_json(Operation::Descriptions, &id_query_pairs(ids))
            .instrument(search_span!(
                operation = Operation::Descriptions.as_str(),
                ids = ids.len()
            ))
            .await?;
        Ok(response.into_map())
    }
}
