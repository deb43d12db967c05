//! Integration tests for the HTTP fetcher and the scrapeability pre-check
//!
//! These tests use wiremock to create mock HTTP servers.

use reqwest::Client;
use std::time::Duration;
use sumi_harvest::config::{FetcherConfig, ScrapeFilterConfig};
use sumi_harvest::crawler::{
    fetch_url, Fetcher, FetcherFactory, HttpFetcherFactory, HttpScrapeFilter, ScrapeFilter,
    Scrapeability,
};
use sumi_harvest::FetchError;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn content_page() -> String {
    format!(
        "<html><body><main><p>{}</p></main></body></html>",
        "Plenty of readable article text. ".repeat(8)
    )
}

fn page_url(server: &MockServer, page: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page)).unwrap()
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = HttpFetcherFactory::new(FetcherConfig::default())
        .open_session()
        .unwrap();
    let body = session.fetch(&page_url(&mock_server, "/page")).await.unwrap();

    assert_eq!(body, "<html>hello</html>");
}

#[tokio::test]
async fn test_fetch_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = FetcherConfig {
        user_agent: "HarvestTest/1.0".to_string(),
        ..FetcherConfig::default()
    };
    let session = HttpFetcherFactory::new(config).open_session().unwrap();

    assert_eq!(session.fetch(&page_url(&mock_server, "/")).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_fetch_maps_error_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let session = HttpFetcherFactory::new(FetcherConfig::default())
        .open_session()
        .unwrap();
    let error = session
        .fetch(&page_url(&mock_server, "/missing"))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_maps_client_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let error = fetch_url(&client, &page_url(&mock_server, "/"))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Timeout { .. }));
}

#[tokio::test]
async fn test_filter_accepts_content_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(content_page(), "text/html"))
        .mount(&mock_server)
        .await;

    let filter = HttpScrapeFilter::new(&ScrapeFilterConfig::default()).unwrap();
    let url = page_url(&mock_server, "/article");

    assert_eq!(filter.check(&url).await, Scrapeability::Scrapeable);
    assert!(filter.is_scrapeable(&url).await);
}

#[tokio::test]
async fn test_filter_rejects_thin_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>Just a stub</body></html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let filter = HttpScrapeFilter::new(&ScrapeFilterConfig::default()).unwrap();

    assert!(matches!(
        filter.check(&page_url(&mock_server, "/")).await,
        Scrapeability::Rejected { .. }
    ));
}

#[tokio::test]
async fn test_filter_rejects_error_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(content_page(), "text/html"))
        .mount(&mock_server)
        .await;

    let filter = HttpScrapeFilter::new(&ScrapeFilterConfig::default()).unwrap();

    assert_eq!(
        filter.check(&page_url(&mock_server, "/")).await,
        Scrapeability::Rejected {
            reason: "HTTP 500".to_string()
        }
    );
}

#[tokio::test]
async fn test_filter_rejects_non_html_content() {
    let mock_server = MockServer::start().await;
    // A body that would pass the text policy if it were parsed as HTML
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(content_page(), "application/pdf"))
        .mount(&mock_server)
        .await;

    let filter = HttpScrapeFilter::new(&ScrapeFilterConfig::default()).unwrap();

    assert_eq!(
        filter.check(&page_url(&mock_server, "/report.pdf")).await,
        Scrapeability::Rejected {
            reason: "non-HTML content type: application/pdf".to_string()
        }
    );
}

#[tokio::test]
async fn test_filter_reports_unreachable_host() {
    // Reserve a port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

    let filter = HttpScrapeFilter::new(&ScrapeFilterConfig::default()).unwrap();
    let verdict = filter.check(&url).await;

    assert!(matches!(verdict, Scrapeability::Unreachable { .. }));
    assert!(!verdict.is_scrapeable());
}
