use crate::UrlError;
use url::Url;

/// Removes the fragment portion (`#...`) of a link reference
///
/// Works on raw `href` values before they are resolved, so it must not
/// assume the input is a valid URL.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::strip_fragment;
///
/// assert_eq!(strip_fragment("/page#top"), "/page");
/// assert_eq!(strip_fragment("#top"), "");
/// assert_eq!(strip_fragment("mailto:a@b.com"), "mailto:a@b.com");
/// ```
pub fn strip_fragment(href: &str) -> &str {
    match href.find('#') {
        Some(index) => &href[..index],
        None => href,
    }
}

/// Normalizes a URL into the form used for crawl identity
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Remove fragment (everything after #)
///
/// Host lowercasing and dot-segment removal come from the WHATWG parser
/// itself. Paths, queries and trailing slashes are otherwise left untouched:
/// two URLs that differ only there are different pages.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/a/../x#section1").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/x");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);

    Ok(url)
}
