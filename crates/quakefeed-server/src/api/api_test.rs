use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use quakefeed_scraper::FetchSettings;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::earthquakes::{parse_selector, EarthquakeQuery};
use super::*;

const BULLETIN: &str = r"
<table>
  <tr><th>Date - Time</th><th>Latitude</th><th>Longitude</th><th>Depth</th><th>Mag</th><th>Location</th></tr>
  <tr><td>16 November 2025 - 09:10 AM</td><td>09.12</td><td>125.77</td><td>012</td><td>2.1</td><td>Claver</td></tr>
  <tr><td>16 November 2025 - 02:35 PM</td><td>06.34</td><td>126.45</td><td>048</td><td>4.5</td><td>Manay</td></tr>
</table>";

fn state_for(server: &MockServer) -> AppState {
    let settings = FetchSettings {
        source_url: format!("{}/", server.uri()),
        timeout_secs: 5,
        user_agent: "quakefeed-test/0.1".to_owned(),
        max_retries: 0,
        backoff_base_ms: 0,
        accept_invalid_certs: false,
    };
    AppState {
        client: Arc::new(BulletinClient::new(&settings).expect("client")),
        options: ExtractOptions::default(),
    }
}

fn app_for(server: &MockServer) -> Router {
    build_app(
        state_for(server),
        RateLimitState::new(100, Duration::from_secs(60)),
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

#[test]
fn api_error_fetch_failed_maps_to_bad_gateway() {
    let response = ApiError::new("fetch_failed", "upstream down").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn api_error_omits_absent_details() {
    let json = serde_json::to_value(ApiError::new("bad_request", "nope")).unwrap();
    assert_eq!(json, serde_json::json!({"error": "bad_request", "message": "nope"}));
}

#[test]
fn parse_selector_requires_both_parts() {
    let query = EarthquakeQuery {
        year: Some("2025".to_owned()),
        month: None,
    };
    assert!(parse_selector(&query).is_err());

    let none = EarthquakeQuery {
        year: None,
        month: None,
    };
    assert!(parse_selector(&none).unwrap().is_none());
}

#[tokio::test]
async fn health_reports_ok() {
    let server = MockServer::start().await;
    let response = app_for(&server).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn earthquakes_returns_records_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BULLETIN))
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(get("/api/earthquakes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[EXTRACTION_STRATEGY_HEADER], "table");
    assert_eq!(response.headers()[EXTRACTION_SKIPPED_HEADER], "1");
    assert!(response.headers().contains_key("x-request-id"));

    let json = json_body(response).await;
    let records = json.as_array().expect("array body");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["place"], "Manay");
    assert_eq!(records[0]["latitude"], 6.34);
    assert_eq!(records[1]["place"], "Claver");
    assert_eq!(records[1]["url"], "");
}

#[tokio::test]
async fn earthquakes_forwards_month_selector_to_archive_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/EQLatest-Monthly/2024/2024_March.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BULLETIN))
        .expect(1)
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(get("/api/earthquakes?year=2024&month=3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn earthquakes_rejects_month_thirteen() {
    let server = MockServer::start().await;
    let response = app_for(&server)
        .oneshot(get("/api/earthquakes?year=2025&month=13"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "bad_request");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn earthquakes_rejects_non_numeric_year() {
    let server = MockServer::start().await;
    let response = app_for(&server)
        .oneshot(get("/api/earthquakes?year=last&month=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn earthquakes_reports_fetch_failure_as_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(get("/api/earthquakes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"], "fetch_failed");
    assert!(json["details"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn earthquakes_returns_empty_array_for_unrelated_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>No news today.</p>"))
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(get("/api/earthquakes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[EXTRACTION_STRATEGY_HEADER], "none");
    assert_eq!(json_body(response).await, serde_json::json!([]));
}
