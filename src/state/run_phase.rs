/// Crawl phase definitions for tracking the lifecycle of a run
///
/// A run moves `Seeded -> Running`, then alternates between `Running` and
/// `Draining` while workers finish and discover new URLs, and finally
/// reaches `Terminated` once the frontier is empty and no worker is active.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// The seed URL is queued and marked visited; no worker dispatched yet
    Seeded,

    /// At least one URL is queued or being processed
    Running,

    /// The frontier is empty but workers are still mid-task
    Draining,

    /// The frontier is empty and no worker is active
    Terminated,
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Staying in the same phase is always allowed except after termination.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        match (self, next) {
            (Terminated, _) => false,
            (a, b) if *a == b => true,
            (Seeded, Running) | (Seeded, Terminated) => true,
            (Running, Draining) | (Running, Terminated) => true,
            (Draining, Running) | (Draining, Terminated) => true,
            _ => false,
        }
    }

    /// Short lowercase name used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CrawlPhase::Seeded.can_transition_to(CrawlPhase::Running));
        assert!(CrawlPhase::Running.can_transition_to(CrawlPhase::Draining));
        assert!(CrawlPhase::Draining.can_transition_to(CrawlPhase::Terminated));
        assert!(CrawlPhase::Running.can_transition_to(CrawlPhase::Terminated));
    }

    #[test]
    fn test_draining_can_resume() {
        assert!(CrawlPhase::Draining.can_transition_to(CrawlPhase::Running));
    }

    #[test]
    fn test_terminated_is_final() {
        for next in [
            CrawlPhase::Seeded,
            CrawlPhase::Running,
            CrawlPhase::Draining,
            CrawlPhase::Terminated,
        ] {
            assert!(!CrawlPhase::Terminated.can_transition_to(next));
        }
    }

    #[test]
    fn test_no_return_to_seeded() {
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Seeded));
        assert!(!CrawlPhase::Draining.can_transition_to(CrawlPhase::Seeded));
        assert!(!CrawlPhase::Seeded.can_transition_to(CrawlPhase::Draining));
    }

    #[test]
    fn test_flags() {
        assert!(CrawlPhase::Terminated.is_terminal());
        assert!(!CrawlPhase::Draining.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlPhase::Draining.to_string(), "draining");
    }
}
