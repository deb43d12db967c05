/// Outcome of one dispatched URL
///
/// Every URL a worker pops ends in exactly one of these outcomes. None of
/// them is fatal to the run.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page was fetched, extracted and written to the output sink
    Persisted { internal_links: usize },

    /// The scrapeability pre-check rejected the page
    Skipped { reason: String },

    /// The fetcher failed or timed out
    FetchFailed { error: String },

    /// The fetched HTML could not be turned into an extraction result
    ExtractFailed { error: String },

    /// Extraction succeeded but the output sink failed to write it
    PersistFailed { error: String, internal_links: usize },

    /// The pipeline for this page panicked
    Crashed { error: String },
}

impl PageOutcome {
    /// Returns true if the page was deliberately not fetched
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Returns true if this represents an error
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. }
                | Self::ExtractFailed { .. }
                | Self::PersistFailed { .. }
                | Self::Crashed { .. }
        )
    }

    /// Number of internal links this page contributed for enqueueing
    pub fn internal_links(&self) -> usize {
        match self {
            Self::Persisted { internal_links } | Self::PersistFailed { internal_links, .. } => {
                *internal_links
            }
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persisted { .. } => "persisted",
            Self::Skipped { .. } => "skipped",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::ExtractFailed { .. } => "extract_failed",
            Self::PersistFailed { .. } => "persist_failed",
            Self::Crashed { .. } => "crashed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persisted { internal_links } => {
                write!(f, "persisted ({} internal links)", internal_links)
            }
            Self::Skipped { reason } => write!(f, "skipped: {}", reason),
            Self::FetchFailed { error }
            | Self::ExtractFailed { error }
            | Self::PersistFailed { error, .. }
            | Self::Crashed { error } => write!(f, "{}: {}", self.as_str(), error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let ok = PageOutcome::Persisted { internal_links: 3 };
        let skipped = PageOutcome::Skipped {
            reason: "too short".to_string(),
        };
        let failed = PageOutcome::FetchFailed {
            error: "timeout".to_string(),
        };
        let crashed = PageOutcome::Crashed {
            error: "renderer crashed".to_string(),
        };

        assert!(!ok.is_error());
        assert!(!ok.is_skipped());
        assert_eq!(ok.internal_links(), 3);
        assert!(skipped.is_skipped());
        assert!(!skipped.is_error());
        assert!(failed.is_error());
        assert!(crashed.is_error());
        assert_eq!(crashed.internal_links(), 0);
    }

    #[test]
    fn test_persist_failure_keeps_links() {
        let outcome = PageOutcome::PersistFailed {
            error: "disk full".to_string(),
            internal_links: 4,
        };
        assert!(outcome.is_error());
        assert_eq!(outcome.internal_links(), 4);
    }

    #[test]
    fn test_display() {
        let outcome = PageOutcome::ExtractFailed {
            error: "bad base".to_string(),
        };
        assert_eq!(outcome.to_string(), "extract_failed: bad base");
        let outcome = PageOutcome::Crashed {
            error: "boom".to_string(),
        };
        assert_eq!(outcome.to_string(), "crashed: boom");
    }
}
