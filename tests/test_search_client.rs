//! Integration tests for the Brave API client
//!
//! Each test stands up a wiremock server in place of the Brave API and checks
//! the request shape the client sends and how it maps the responses.

mod test_helpers;

use brave_search_mcp::search::{
    BraveClient, BraveClientConfig, Operation, RateLimiter, SearchBackend, WebSearchParams,
};
use brave_search_mcp::SearchError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use test_helpers::{client_for, generous_limits, locations_body, poi, web_body, TEST_API_KEY};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_web_search_sends_token_and_parses_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web/search"))
        .and(header("X-Subscription-Token", TEST_API_KEY))
        .and(header("Accept", "application/json"))
        .and(query_param("q", "rust async"))
        .and(query_param("count", "10"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(web_body(&[
            ("Tokio", "An async runtime", "https://tokio.rs"),
            ("async-std", "Another runtime", "https://async.rs"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, generous_limits());
    let page = client
        .web_search(&WebSearchParams::web("rust async", 10, 0))
        .await
        .unwrap();

    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].title, "Tokio");
    assert_eq!(page.results[1].url, "https://async.rs");
    assert!(page.locations.is_empty());
}

#[tokio::test]
async fn test_web_search_clamps_count_to_twenty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web/search"))
        .and(query_param("count", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(web_body(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, generous_limits());
    let page = client
        .web_search(&WebSearchParams::web("many", 50, 0))
        .await
        .unwrap();

    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_location_search_requests_location_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web/search"))
        .and(query_param("q", "pizza near Central Park"))
        .and(query_param("search_lang", "en"))
        .and(query_param("result_filter", "locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(locations_body(&["loc1", "loc2"])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, generous_limits());
    let page = client
        .web_search(&WebSearchParams::locations("pizza near Central Park", 5))
        .await
        .unwrap();

    assert_eq!(page.location_ids(), vec!["loc1", "loc2"]);

    let requests = server.received_requests().await.unwrap();
    assert!(
        !requests[0].url.query_pairs().any(|(k, _)| k == "offset"),
        "Location search should not send an offset"
    );
}

#[tokio::test]
async fn test_pois_sends_repeated_ids_without_empty_values() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/local/pois"))
        .and(query_param("ids", "loc1"))
        .and(query_param("ids", "loc2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [poi("loc1", "Joe's Pizza"), poi("loc2", "Slice House")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, generous_limits());
    let ids = vec!["loc1".to_string(), String::new(), "loc2".to_string()];
    let pois = client.pois(&ids).await.unwrap();

    assert_eq!(pois.len(), 2);
    assert_eq!(pois[0].name, "Joe's Pizza");
    assert_eq!(pois[1].id, "loc2");

    let requests = server.received_requests().await.unwrap();
    let sent_ids: Vec<String> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "ids")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(sent_ids, vec!["loc1", "loc2"]);
}

#[tokio::test]
async fn test_descriptions_skip_null_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/local/descriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "descriptions": {"loc1": "Great pizza", "loc2": null}
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, generous_limits());
    let descriptions = client
        .descriptions(&["loc1".to_string(), "loc2".to_string()])
        .await
        .unwrap();

    assert_eq!(descriptions.get("loc1").map(String::as_str), Some("Great pizza"));
    assert!(!descriptions.contains_key("loc2"));
}

#[tokio::test]
async fn test_non_success_status_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/local/pois"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, generous_limits());
    let error = client.pois(&["loc1".to_string()]).await.unwrap_err();

    assert_eq!(
        error,
        SearchError::upstream(Operation::Pois, 500, "upstream exploded")
    );
    assert_eq!(
        error.to_string(),
        "Brave API error (POI): 500 Internal Server Error\nupstream exploded"
    );
}

#[tokio::test]
async fn test_unauthorized_status_is_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, generous_limits());
    let error = client
        .web_search(&WebSearchParams::web("q", 10, 0))
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(401));
    assert_eq!(error.operation(), Some(Operation::WebSearch));
}

#[tokio::test]
async fn test_non_json_body_is_malformed_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, generous_limits());
    let error = client
        .web_search(&WebSearchParams::web("q", 10, 0))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        SearchError::MalformedResponse {
            operation: Operation::WebSearch,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rate_limited_call_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(web_body(&[])))
        .expect(1)
        .mount(&server)
        .await;

    // Default limits: one request per second
    let (client, limiter) = client_for(&server, Default::default());

    client
        .web_search(&WebSearchParams::web("first", 10, 0))
        .await
        .unwrap();
    let error = client
        .web_search(&WebSearchParams::web("second", 10, 0))
        .await
        .unwrap_err();

    assert_eq!(error, SearchError::RateLimitExceeded);
    assert_eq!(limiter.snapshot().month_count, 1);
}

#[tokio::test]
async fn test_failed_request_still_consumes_quota() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/local/descriptions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (client, limiter) = client_for(&server, generous_limits());
    assert!(client.descriptions(&["loc1".to_string()]).await.is_err());

    assert_eq!(limiter.snapshot().month_count, 1);
}

#[tokio::test]
async fn test_unreadable_error_body_yields_empty_body() {
    // Server promises more body bytes than it sends, then hangs up
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        let _ = socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial")
            .await;
        let _ = socket.shutdown().await;
    });

    let config = BraveClientConfig {
        api_key: TEST_API_KEY.to_string(),
        base_url: url::Url::parse(&format!("http://{addr}/")).unwrap(),
        timeout: Duration::from_secs(5),
    };
    let client = BraveClient::new(config, Arc::new(RateLimiter::new(generous_limits()))).unwrap();

    let error = client.pois(&["loc1".to_string()]).await.unwrap_err();

    assert_eq!(error, SearchError::upstream(Operation::Pois, 500, ""));
}
