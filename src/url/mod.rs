//! URL handling module for Sumi-Harvest
//!
//! This module provides fragment stripping, crawl-identity normalization,
//! domain extraction and the internal/external test used for link scoping.

mod domain;
mod normalize;

use crate::UrlError;
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, is_internal};
pub use normalize::{normalize_url, strip_fragment};

/// A URL the crawler may visit
///
/// Identity is defined on the URL with its fragment removed, so
/// `https://example.com/x#a` and `https://example.com/x` are the same target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrawlTarget(Url);

impl CrawlTarget {
    /// Parses and normalizes a URL string into a crawl target
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_harvest::url::CrawlTarget;
    ///
    /// let a = CrawlTarget::parse("https://example.com/x#section1").unwrap();
    /// let b = CrawlTarget::parse("https://example.com/x").unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn parse(url_str: &str) -> Result<Self, UrlError> {
        normalize_url(url_str).map(Self)
    }

    /// The normalized URL
    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CrawlTarget {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fragment_insensitive_identity() {
        let mut set = HashSet::new();
        assert!(set.insert(CrawlTarget::parse("https://example.com/x#section1").unwrap()));
        assert!(!set.insert(CrawlTarget::parse("https://example.com/x").unwrap()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_distinct_paths_are_distinct() {
        let a = CrawlTarget::parse("https://example.com/x").unwrap();
        let b = CrawlTarget::parse("https://example.com/y").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_strips_fragment() {
        let target = CrawlTarget::parse("https://example.com/page#frag").unwrap();
        assert_eq!(target.as_str(), "https://example.com/page");
        assert_eq!(target.url().fragment(), None);
    }

    #[test]
    fn test_display() {
        let target = CrawlTarget::parse("https://example.com/a").unwrap();
        assert_eq!(target.to_string(), "https://example.com/a");
    }

    #[test]
    fn test_rejects_non_http() {
        assert!(CrawlTarget::parse("tel:+123").is_err());
    }
}
