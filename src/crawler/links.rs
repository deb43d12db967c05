//! Link categorization
//!
//! Sorts every `<a href>` on a page into telephone, email, internal and
//! external buckets. Internal links are what the crawl follows.

use crate::url::{is_internal, strip_fragment};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

/// The four disjoint link collections extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedLinks {
    pub telephone: BTreeSet<String>,
    pub email: BTreeSet<String>,
    pub internal: BTreeSet<String>,
    pub external: BTreeSet<String>,
}

impl CategorizedLinks {
    /// Total number of distinct links across all categories
    pub fn len(&self) -> usize {
        self.telephone.len() + self.email.len() + self.internal.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Categorizes every hyperlink in an HTML string
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::categorize_links;
/// use url::Url;
///
/// let html = r#"<a href="mailto:a@b.com">mail</a><a href="/path">p</a>"#;
/// let page = Url::parse("https://example.com/").unwrap();
/// let links = categorize_links(html, &page, "example.com");
/// assert!(links.email.contains("mailto:a@b.com"));
/// assert!(links.internal.contains("https://example.com/path"));
/// ```
pub fn categorize_links(html: &str, page_url: &Url, target_domain: &str) -> CategorizedLinks {
    let document = Html::parse_document(html);
    categorize_document_links(&document, page_url, target_domain)
}

/// Categorizes every hyperlink in an already parsed document
///
/// # Rules
///
/// - Empty hrefs, and hrefs that are empty once the fragment is removed, are skipped
/// - `mailto:` goes to email, `tel:` goes to telephone (kept as written, minus fragment)
/// - Everything else is joined against the page URL; unresolvable references are skipped
/// - A resolved URL is internal iff the target domain is a substring of its host
pub fn categorize_document_links(
    document: &Html,
    page_url: &Url,
    target_domain: &str,
) -> CategorizedLinks {
    let mut links = CategorizedLinks::default();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if let Some(href) = element.value().attr("href") {
            categorize_href(&mut links, href, page_url, target_domain);
        }
    }

    links
}

fn categorize_href(links: &mut CategorizedLinks, href: &str, page_url: &Url, target_domain: &str) {
    let cleaned = strip_fragment(href.trim()).trim();
    if cleaned.is_empty() {
        return;
    }

    let lowered = cleaned.to_ascii_lowercase();
    if lowered.starts_with("mailto:") {
        links.email.insert(cleaned.to_string());
        return;
    }
    if lowered.starts_with("tel:") {
        links.telephone.insert(cleaned.to_string());
        return;
    }

    let mut resolved = match page_url.join(cleaned) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Skipping unresolvable href {:?} on {}: {}", href, page_url, e);
            return;
        }
    };
    resolved.set_fragment(None);

    if is_internal(&resolved, target_domain) {
        links.internal.insert(resolved.to_string());
    } else {
        links.external.insert(resolved.to_string());
    }
}
