//! Integration tests for `BulletinClient::fetch_bulletin` and `scrape`.
//!
//! Uses `wiremock` so no real network traffic is made.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quakefeed_scraper::{
    scrape, BulletinClient, ExtractOptions, FetchError, FetchSettings, MonthSelector, Strategy,
};

const BULLETIN_LATEST: &str = include_str!("fixtures/bulletin_latest.html");
const TEST_UA: &str = "quakefeed-test/0.1";

fn settings(source_url: &str, max_retries: u32) -> FetchSettings {
    FetchSettings {
        source_url: source_url.to_owned(),
        timeout_secs: 5,
        user_agent: TEST_UA.to_owned(),
        max_retries,
        backoff_base_ms: 1,
        accept_invalid_certs: false,
    }
}

fn test_client(server: &MockServer) -> BulletinClient {
    BulletinClient::new(&settings(&format!("{}/", server.uri()), 0))
        .expect("failed to build test BulletinClient")
}

#[tokio::test]
async fn fetch_returns_body_with_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", TEST_UA))
        .respond_with(ResponseTemplate::new(200).set_body_string(BULLETIN_LATEST))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_client(&server).fetch_bulletin(None).await.unwrap();
    assert!(body.contains("Manay"));
}

#[tokio::test]
async fn fetch_falls_back_to_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", TEST_UA))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BULLETIN_LATEST))
        .mount(&server)
        .await;

    let result = test_client(&server).fetch_bulletin(None).await;
    assert!(result.is_ok(), "expected fallback to succeed, got: {result:?}");
}

#[tokio::test]
async fn fetch_reports_all_attempts_failed_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_bulletin(None).await.unwrap_err();
    match err {
        FetchError::AllAttemptsFailed { attempts, last, .. } => {
            assert_eq!(attempts, 2);
            assert!(
                matches!(*last, FetchError::UnexpectedStatus { status: 404, .. }),
                "unexpected inner error: {last:?}"
            );
        }
        other => panic!("expected AllAttemptsFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_rejects_blank_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   \n"))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_bulletin(None).await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::AllAttemptsFailed { ref last, .. } if matches!(**last, FetchError::EmptyDocument { .. })
    ));
}

#[tokio::test]
async fn fetch_retries_server_errors_before_succeeding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BULLETIN_LATEST))
        .mount(&server)
        .await;

    let client = BulletinClient::new(&settings(&format!("{}/", server.uri()), 1)).unwrap();
    assert!(client.fetch_bulletin(None).await.is_ok());
}

#[tokio::test]
async fn month_selector_requests_monthly_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/EQLatest-Monthly/2025/2025_November.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BULLETIN_LATEST))
        .expect(1)
        .mount(&server)
        .await;

    let selector = MonthSelector::new(2025, 11).unwrap();
    let extraction = scrape(&test_client(&server), Some(selector), &ExtractOptions::default())
        .await
        .unwrap();
    assert_eq!(extraction.report.strategy, Some(Strategy::Table));
    assert_eq!(extraction.records.len(), 3);
}
