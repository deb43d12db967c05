//! HTML parser for page extraction
//!
//! This module turns rendered HTML into an [`ExtractionResult`]:
//! - `<meta>` tags keyed by `property` or `name`
//! - Image references from `<img>` tags
//! - Categorized links (see [`CategorizedLinks`])
//! - Whitespace-normalized visible text

use crate::crawler::links::{categorize_document_links, CategorizedLinks};
use crate::ExtractError;
use scraper::{Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// An image found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// `<img src>` resolved against the page URL
    Resolved { src: String },

    /// `<img>` declared only through `srcset`; candidates are kept verbatim
    Unresolved { srcset: String },
}

impl ImageRef {
    /// The absolute URL, if this image was resolved
    pub fn src(&self) -> Option<&str> {
        match self {
            Self::Resolved { src } => Some(src),
            Self::Unresolved { .. } => None,
        }
    }
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// `<meta>` content keyed by `property`, falling back to `name`
    pub metadata: BTreeMap<String, String>,

    /// Images in document order
    pub images: Vec<ImageRef>,

    pub links: CategorizedLinks,

    /// Visible text, whitespace collapsed to single spaces
    pub text: String,
}

/// Extracts metadata, images, links and text from rendered HTML
///
/// # Arguments
///
/// * `html` - The rendered HTML content
/// * `page_url` - URL of the page, used to resolve relative references
/// * `target_domain` - Domain substring that marks a link as internal
///
/// # Returns
///
/// * `Ok(ExtractionResult)` - Extraction succeeded
/// * `Err(ExtractError)` - The page URL cannot anchor relative references
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><meta name="description" content="Hi"></head>
///     <body><p>Hello   world</p><img src="/a.png"></body></html>"#;
/// let page = Url::parse("https://example.com/").unwrap();
/// let result = extract_page(html, &page, "example.com").unwrap();
/// assert_eq!(result.metadata["description"], "Hi");
/// assert_eq!(result.images[0].src(), Some("https://example.com/a.png"));
/// assert_eq!(result.text, "Hello world");
/// ```
pub fn extract_page(
    html: &str,
    page_url: &Url,
    target_domain: &str,
) -> Result<ExtractionResult, ExtractError> {
    if page_url.cannot_be_a_base() {
        return Err(ExtractError::InvalidBase(page_url.to_string()));
    }

    let document = Html::parse_document(html);

    let metadata = extract_metadata(&document);
    let images = extract_images(&document, page_url);
    let links = categorize_document_links(&document, page_url, target_domain);
    let text = visible_text(&document);

    tracing::trace!(
        "Extracted {} meta tags, {} images, {} links, {} text chars from {}",
        metadata.len(),
        images.len(),
        links.len(),
        text.len(),
        page_url
    );

    Ok(ExtractionResult {
        metadata,
        images,
        links,
        text,
    })
}

/// Collects `<meta>` tags; a repeated key keeps the last value seen
fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    let Ok(meta_selector) = Selector::parse("meta") else {
        return metadata;
    };

    for element in document.select(&meta_selector) {
        let attrs = element.value();
        let key = attrs
            .attr("property")
            .filter(|k| !k.is_empty())
            .or_else(|| attrs.attr("name").filter(|k| !k.is_empty()));

        if let (Some(key), Some(content)) = (key, attrs.attr("content")) {
            if !content.is_empty() {
                metadata.insert(key.to_string(), content.to_string());
            }
        }
    }

    metadata
}

fn extract_images(document: &Html, page_url: &Url) -> Vec<ImageRef> {
    let mut images = Vec::new();

    let Ok(img_selector) = Selector::parse("img") else {
        return images;
    };

    for element in document.select(&img_selector) {
        let attrs = element.value();
        let src = attrs.attr("src").map(str::trim).filter(|s| !s.is_empty());

        if let Some(src) = src {
            match page_url.join(src) {
                Ok(resolved) => images.push(ImageRef::Resolved {
                    src: resolved.to_string(),
                }),
                Err(e) => tracing::trace!("Skipping unresolvable img src {:?}: {}", src, e),
            }
        } else if let Some(srcset) = attrs.attr("srcset").map(str::trim).filter(|s| !s.is_empty()) {
            images.push(ImageRef::Unresolved {
                srcset: srcset.to_string(),
            });
        }
    }

    images
}

/// Concatenates the document's rendered text nodes
///
/// Text under `script`, `style`, `noscript` and `template` is ignored. Runs of
/// whitespace (including across node boundaries) collapse to a single space
/// and the result is trimmed.
pub fn visible_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}
