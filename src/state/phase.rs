//! Lifecycle of the crawl event loop
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlPhase {
    /// New fetches may be scheduled as links are discovered
    #[default]
    Running,

    /// Interrupted or out of budget: no new fetches, waiting for in-flight ones to finish
    Draining,

    /// No transfer remains in flight; the loop has exited
    Terminated,
}

impl CrawlPhase {
    /// Returns true if the controller may still issue new fetches
    pub fn accepts_work(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Moves to `next` if the transition is allowed
    ///
    /// Phases only move forward: Running → Draining → Terminated, or Running →
    /// Terminated directly when the frontier runs dry. Returns whether the phase changed.
    pub fn advance(&mut self, next: CrawlPhase) -> bool {
        let allowed = matches!(
            (*self, next),
            (Self::Running, Self::Draining)
                | (Self::Running, Self::Terminated)
                | (Self::Draining, Self::Terminated)
        );
        if allowed {
            *self = next;
        }
        allowed
    }

    pub fn as_str(&self) -> &'static str {
        match self {
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
