use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (e.g. `mailto:` or `javascript:` URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::extract_domain;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://sub.example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("sub.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if a URL belongs to the crawl's target domain
///
/// A URL is internal iff the target-domain string occurs anywhere in its
/// host. `blog.example.com` is therefore internal to `example.com`, and so is
/// `example.com.evil.net`. URLs without a host are never internal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::is_internal;
///
/// let url = Url::parse("https://blog.example.com/post").unwrap();
/// assert!(is_internal(&url, "example.com"));
///
/// let url = Url::parse("https://other.com/example.com").unwrap();
/// assert!(!is_internal(&url, "example.com"));
/// ```
pub fn is_internal(url: &Url, target_domain: &str) -> bool {
    let target = target_domain.trim().to_lowercase();
    if target.is_empty() {
        return false;
    }

    extract_domain(url)
        .map(|host| host.contains(&target))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_no_host() {
        let url = Url::parse("mailto:a@b.com").unwrap();
        assert_eq!(extract_domain(&url), None);
    }

    #[test]
    fn test_internal_exact_and_subdomain() {
        let exact = Url::parse("https://example.com/x").unwrap();
        let sub = Url::parse("https://www.example.com/x").unwrap();
        assert!(is_internal(&exact, "example.com"));
        assert!(is_internal(&sub, "example.com"));
    }

    #[test]
    fn test_path_does_not_make_internal() {
        let url = Url::parse("https://other.com/?next=example.com").unwrap();
        assert!(!is_internal(&url, "example.com"));
    }

    #[test]
    fn test_target_domain_case_insensitive() {
        let url = Url::parse("https://example.com/").unwrap();
        assert!(is_internal(&url, "Example.COM"));
    }

    #[test]
    fn test_empty_target_is_never_internal() {
        let url = Url::parse("https://example.com/").unwrap();
        assert!(!is_internal(&url, ""));
    }
}
