//! Page fetcher capability
//!
//! This module defines what the crawl engine needs from whatever renders
//! pages: "given a URL, return HTML or fail". It includes:
//! - The `Fetcher` session trait and the `FetcherFactory` that opens sessions
//! - A bundled reqwest-backed implementation
//! - Error classification for failed requests
//!
//! The engine opens one session per worker and never shares a session
//! between concurrent tasks, so stateful backends (browser sessions with
//! cookies and a current page) are safe to plug in.

use crate::config::FetcherConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// One fetching session
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves the rendered HTML of a page
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Opens independent fetcher sessions, one per crawl worker
pub trait FetcherFactory: Send + Sync {
    fn open_session(&self) -> Result<Box<dyn Fetcher>, FetchError>;
}

/// Fetcher that retrieves pages with a plain HTTP GET
///
/// No JavaScript is executed; the HTML is whatever the server returns.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        fetch_url(&self.client, url).await
    }
}

/// Factory handing out [`HttpFetcher`] sessions
///
/// Each session gets its own client, and with it its own connection pool
/// and cookie state.
#[derive(Debug, Clone)]
pub struct HttpFetcherFactory {
    config: FetcherConfig,
}

impl HttpFetcherFactory {
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }
}

impl FetcherFactory for HttpFetcherFactory {
    fn open_session(&self) -> Result<Box<dyn Fetcher>, FetchError> {
        let client = build_http_client(&self.config)
            .map_err(|e| FetchError::Session(e.to_string()))?;
        Ok(Box::new(HttpFetcher::new(client)))
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::FetcherConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    // The overall request deadline is enforced by the engine's fetch timeout
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body
///
/// # Error Mapping
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | body text |
/// | any other status | `FetchError::Status` |
/// | timeout | `FetchError::Timeout` |
/// | connection / body failure | `FetchError::Http` |
pub async fn fetch_url(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(url, status));
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

fn status_error(url: &Url, status: StatusCode) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetcherConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_factory_opens_sessions() {
        let factory = HttpFetcherFactory::new(FetcherConfig::default());
        assert!(factory.open_session().is_ok());
        assert!(factory.open_session().is_ok());
    }

    #[test]
    fn test_status_error_message() {
        let url = Url::parse("https://example.com/missing").unwrap();
        let error = status_error(&url, StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "HTTP 404 for https://example.com/missing");
    }

    // Request/response behavior is covered with wiremock in tests/fetch_tests.rs
}
