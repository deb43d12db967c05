//! Filesystem output sink
//!
//! Writes one directory per worker slot under the output root:
//!
//! ```text
//! <root>/scraper=<slot>/
//!     meta_data.json   metadata key/value map
//!     images.json      image references in document order
//!     links.json       page URL (`base`) and the four link sets
//!     links.txt        the same links as a readable grouped listing
//!     text.json        {"text_content": "..."}
//! ```
//!
//! Every facet is serialized on its own, so a reader can load just the part
//! it needs.

use crate::crawler::{CategorizedLinks, ExtractionResult, ImageRef, WorkerSlot};
use crate::output::traits::{OutputError, OutputResult, OutputSink};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

const METADATA_FILE: &str = "meta_data.json";
const IMAGES_FILE: &str = "images.json";
const LINKS_FILE: &str = "links.json";
const LINKS_TEXT_FILE: &str = "links.txt";
const TEXT_FILE: &str = "text.json";

/// On-disk form of the links facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksFacet {
    /// URL of the page the links were found on
    pub base: String,
    pub telephone: BTreeSet<String>,
    pub email: BTreeSet<String>,
    pub internal: BTreeSet<String>,
    pub external: BTreeSet<String>,
}

impl LinksFacet {
    fn new(page_url: &Url, links: &CategorizedLinks) -> Self {
        Self {
            base: page_url.to_string(),
            telephone: links.telephone.clone(),
            email: links.email.clone(),
            internal: links.internal.clone(),
            external: links.external.clone(),
        }
    }

    fn into_links(self) -> CategorizedLinks {
        CategorizedLinks {
            telephone: self.telephone,
            email: self.email,
            internal: self.internal,
            external: self.external,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TextFacet {
    text_content: String,
}

/// A bundle read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBundle {
    pub slot: WorkerSlot,
    pub page_url: String,
    pub extraction: ExtractionResult,
}

/// Output sink writing JSON facet files under a root directory
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    root: PathBuf,
}

impl JsonFileSink {
    /// Creates a sink rooted at `root`; the directory is created lazily
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the bundle of one worker slot
    pub fn bundle_dir(&self, slot: WorkerSlot) -> PathBuf {
        self.root.join(format!("scraper={}", slot))
    }

    /// Reads a persisted bundle back from disk
    pub fn read_bundle(&self, slot: WorkerSlot) -> OutputResult<PageBundle> {
        let dir = self.bundle_dir(slot);
        if !dir.is_dir() {
            return Err(OutputError::MissingBundle(slot));
        }

        let metadata: BTreeMap<String, String> = read_json(&dir.join(METADATA_FILE))?;
        let images: Vec<ImageRef> = read_json(&dir.join(IMAGES_FILE))?;
        let links: LinksFacet = read_json(&dir.join(LINKS_FILE))?;
        let text: TextFacet = read_json(&dir.join(TEXT_FILE))?;

        Ok(PageBundle {
            slot,
            page_url: links.base.clone(),
            extraction: ExtractionResult {
                metadata,
                images,
                links: links.into_links(),
                text: text.text_content,
            },
        })
    }

    /// Lists the slots that have a bundle directory, in ascending order
    pub fn list_slots(&self) -> OutputResult<Vec<WorkerSlot>> {
        let mut slots = Vec::new();
        if !self.root.is_dir() {
            return Ok(slots);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let slot = name
                .to_str()
                .and_then(|n| n.strip_prefix("scraper="))
                .and_then(|id| id.parse::<u64>().ok());
            if let Some(id) = slot {
                slots.push(WorkerSlot(id));
            }
        }

        slots.sort();
        Ok(slots)
    }
}

impl OutputSink for JsonFileSink {
    fn persist(
        &self,
        slot: WorkerSlot,
        page_url: &Url,
        result: &ExtractionResult,
    ) -> OutputResult<()> {
        let dir = self.bundle_dir(slot);
        fs::create_dir_all(&dir)?;

        let links = LinksFacet::new(page_url, &result.links);

        write_json(&dir.join(METADATA_FILE), &result.metadata)?;
        write_json(&dir.join(IMAGES_FILE), &result.images)?;
        write_json(&dir.join(LINKS_FILE), &links)?;
        write_links_listing(&dir.join(LINKS_TEXT_FILE), &links)?;
        write_json(
            &dir.join(TEXT_FILE),
            &TextFacet {
                text_content: result.text.clone(),
            },
        )?;

        tracing::debug!("Saved bundle for {} to {}", page_url, dir.display());
        Ok(())
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> OutputResult<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn write_links_listing(path: &Path, links: &LinksFacet) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    let sections = [
        ("Telephone Links", &links.telephone),
        ("Email Links", &links.email),
        ("Internal Links", &links.internal),
        ("External Links", &links.external),
    ];

    for (index, (title, entries)) in sections.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}:", title)?;
        for entry in entries.iter() {
            writeln!(writer, "{}", entry)?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_result() -> ExtractionResult {
        let mut result = ExtractionResult::default();
        result
            .metadata
            .insert("og:title".to_string(), "Sample".to_string());
        result.images.push(ImageRef::Resolved {
            src: "https://example.com/a.png".to_string(),
        });
        result.images.push(ImageRef::Unresolved {
            srcset: "b.png 2x".to_string(),
        });
        result
            .links
            .internal
            .insert("https://example.com/next".to_string());
        result
            .links
            .email
            .insert("mailto:team@example.com".to_string());
        result.text = "Sample page text".to_string();
        result
    }

    #[test]
    fn test_persist_writes_all_facets() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let url = Url::parse("https://example.com/page").unwrap();

        sink.persist(WorkerSlot(7), &url, &sample_result()).unwrap();

        let bundle = dir.path().join("scraper=7");
        for file in [METADATA_FILE, IMAGES_FILE, LINKS_FILE, LINKS_TEXT_FILE, TEXT_FILE] {
            assert!(bundle.join(file).is_file(), "missing {}", file);
        }
    }

    #[test]
    fn test_read_bundle_restores_result() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let url = Url::parse("https://example.com/page").unwrap();
        let result = sample_result();

        sink.persist(WorkerSlot(3), &url, &result).unwrap();
        let bundle = sink.read_bundle(WorkerSlot(3)).unwrap();

        assert_eq!(bundle.slot, WorkerSlot(3));
        assert_eq!(bundle.page_url, "https://example.com/page");
        assert_eq!(bundle.extraction, result);
    }

    #[test]
    fn test_text_facet_shape() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let url = Url::parse("https://example.com/").unwrap();

        sink.persist(WorkerSlot(0), &url, &sample_result()).unwrap();

        let raw = fs::read_to_string(dir.path().join("scraper=0").join(TEXT_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["text_content"], "Sample page text");
    }

    #[test]
    fn test_links_listing_sections() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let url = Url::parse("https://example.com/").unwrap();

        sink.persist(WorkerSlot(0), &url, &sample_result()).unwrap();

        let listing =
            fs::read_to_string(dir.path().join("scraper=0").join(LINKS_TEXT_FILE)).unwrap();
        assert!(listing.starts_with("Telephone Links:\n"));
        assert!(listing.contains("\nEmail Links:\nmailto:team@example.com\n"));
        assert!(listing.contains("\nInternal Links:\nhttps://example.com/next\n"));
        assert!(listing.ends_with("External Links:\n"));
    }

    #[test]
    fn test_missing_bundle() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path());
        assert!(matches!(
            sink.read_bundle(WorkerSlot(42)),
            Err(OutputError::MissingBundle(WorkerSlot(42)))
        ));
    }

    #[test]
    fn test_list_slots_sorted() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let url = Url::parse("https://example.com/").unwrap();

        for slot in [10, 2, 5] {
            sink.persist(WorkerSlot(slot), &url, &ExtractionResult::default())
                .unwrap();
        }
        fs::create_dir(dir.path().join("unrelated")).unwrap();

        assert_eq!(
            sink.list_slots().unwrap(),
            vec![WorkerSlot(2), WorkerSlot(5), WorkerSlot(10)]
        );
    }

    #[test]
    fn test_persist_fails_when_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file_root = dir.path().join("not-a-dir");
        fs::write(&file_root, "x").unwrap();

        let sink = JsonFileSink::new(&file_root);
        let url = Url::parse("https://example.com/").unwrap();
        assert!(sink
            .persist(WorkerSlot(0), &url, &ExtractionResult::default())
            .is_err());
    }
}
