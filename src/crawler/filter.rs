//! Scrapeability pre-check
//!
//! Before a worker spends a fetcher session on a URL, a plain HTTP GET
//! decides whether the page looks like it carries content at all. The check
//! is an approximation: a page that passes may still yield little signal.

use crate::config::ScrapeFilterConfig;
use crate::crawler::parser::visible_text;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Tags whose presence marks a document as content-bearing
const CONTENT_CONTAINERS: &str = "article, main, div, section";

/// Verdict of the pre-check for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scrapeability {
    /// Worth a full fetch
    Scrapeable,

    /// Reachable, but not worth fetching
    Rejected { reason: String },

    /// The lightweight request itself failed
    Unreachable { reason: String },
}

impl Scrapeability {
    pub fn is_scrapeable(&self) -> bool {
        matches!(self, Self::Scrapeable)
    }
}

impl fmt::Display for Scrapeability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scrapeable => write!(f, "scrapeable"),
            Self::Rejected { reason } => write!(f, "rejected: {}", reason),
            Self::Unreachable { reason } => write!(f, "unreachable: {}", reason),
        }
    }
}

/// Decides cheaply whether a URL deserves a full fetch
#[async_trait]
pub trait ScrapeFilter: Send + Sync {
    /// Checks a URL; never fails, network problems become `Unreachable`
    async fn check(&self, url: &Url) -> Scrapeability;

    async fn is_scrapeable(&self, url: &Url) -> bool {
        self.check(url).await.is_scrapeable()
    }
}

/// Filter that lets every URL through
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl ScrapeFilter for AcceptAll {
    async fn check(&self, _url: &Url) -> Scrapeability {
        Scrapeability::Scrapeable
    }
}

/// Pre-check backed by a plain HTTP GET
#[derive(Debug, Clone)]
pub struct HttpScrapeFilter {
    client: Client,
    min_text_length: usize,
}

impl HttpScrapeFilter {
    /// Builds the filter's HTTP client from configuration
    pub fn new(config: &ScrapeFilterConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.timeout_ms))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self::with_client(client, config.min_text_length))
    }

    pub fn with_client(client: Client, min_text_length: usize) -> Self {
        Self {
            client,
            min_text_length,
        }
    }
}

#[async_trait]
impl ScrapeFilter for HttpScrapeFilter {
    async fn check(&self, url: &Url) -> Scrapeability {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                return Scrapeability::Unreachable {
                    reason: describe_request_error(&e),
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());
            if !is_html_content_type(content_type) {
                return Scrapeability::Rejected {
                    reason: format!("non-HTML content type: {}", content_type.unwrap_or("")),
                };
            }
        }

        match response.text().await {
            Ok(body) => assess_document(status, &body, self.min_text_length),
            Err(e) => Scrapeability::Unreachable {
                reason: format!("Failed to read body: {}", e),
            },
        }
    }
}

/// Returns true if a `Content-Type` value may carry an HTML document
///
/// A missing header is given the benefit of the doubt.
fn is_html_content_type(content_type: Option<&str>) -> bool {
    content_type.map_or(true, |value| value.to_ascii_lowercase().contains("html"))
}

/// Applies the scrapeability policy to a retrieved response
///
/// # Policy
///
/// - Non-success status → rejected
/// - Visible text shorter than `min_text_length` characters → rejected
/// - No `article`, `main`, `div` or `section` element → rejected
///
/// # Example
///
/// ```
/// use reqwest::StatusCode;
/// use sumi_harvest::crawler::assess_document;
///
/// let body = format!("<main>{}</main>", "a".repeat(200));
/// assert!(assess_document(StatusCode::OK, &body, 50).is_scrapeable());
/// ```
pub fn assess_document(status: StatusCode, body: &str, min_text_length: usize) -> Scrapeability {
    if !status.is_success() {
        return Scrapeability::Rejected {
            reason: format!("HTTP {}", status.as_u16()),
        };
    }

    let document = Html::parse_document(body);

    let text_length = visible_text(&document).chars().count();
    if text_length < min_text_length {
        return Scrapeability::Rejected {
            reason: format!(
                "only {} characters of text (minimum {})",
                text_length, min_text_length
            ),
        };
    }

    let has_container = Selector::parse(CONTENT_CONTAINERS)
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false);
    if !has_container {
        return Scrapeability::Rejected {
            reason: "no content container element".to_string(),
        };
    }

    Scrapeability::Scrapeable
}

fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}
