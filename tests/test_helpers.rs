//! Test helpers and utilities for integration tests

use brave_search_mcp::search::{BraveClient, BraveClientConfig, RateLimiter, RateLimits};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::MockServer;

#[allow(dead_code)]
pub const TEST_API_KEY: &str = "test-subscription-token";

/// Limits high enough that a whole local search fits in one second
#[allow(dead_code)]
pub fn generous_limits() -> RateLimits {
    RateLimits {
        per_second: 100,
        per_month: 15_000,
    }
}

/// Build a client pointed at a wiremock server
#[allow(dead_code)]
pub fn client_for(server: &MockServer, limits: RateLimits) -> (BraveClient, Arc<RateLimiter>) {
    let limiter = Arc::new(RateLimiter::new(limits));
    let config = BraveClientConfig {
        api_key: TEST_API_KEY.to_string(),
        base_url: Url::parse(&format!("{}/", server.uri())).unwrap(),
        timeout: Duration::from_secs(5),
    };
    let client = BraveClient::new(config, limiter.clone()).unwrap();
    (client, limiter)
}

/// `web/search` body with ordinary web results
#[allow(dead_code)]
pub fn web_body(results: &[(&str, &str, &str)]) -> Value {
    let results: Vec<Value> = results
        .iter()
        .map(|(title, description, url)| {
            json!({"title": title, "description": description, "url": url})
        })
        .collect();
    json!({"type": "search", "web": {"results": results}})
}

/// `web/search` body carrying only location references
#[allow(dead_code)]
pub fn locations_body(ids: &[&str]) -> Value {
    let results: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "title": format!("Place {id}")}))
        .collect();
    json!({"type": "search", "locations": {"results": results}})
}

/// Minimal POI record
#[allow(dead_code)]
pub fn poi(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "address": {
            "streetAddress": "1 Main St",
            "addressLocality": "Springfield",
            "addressRegion": "IL",
            "postalCode": "62701"
        },
        "phone": "555-0100",
        "rating": {"ratingValue": 4.5, "ratingCount": 120},
        "openingHours": ["Mo-Fr 11:00-22:00"],
        "priceRange": "$$"
    })
}
