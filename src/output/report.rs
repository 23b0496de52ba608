//! Crawl report types
//!
//! This module defines the result of a finished crawl and the error type for
//! exporting it.

use crate::graph::CrawlGraph;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while exporting a crawl graph
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write graph to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Why a link is considered broken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFailure {
    /// The final response carried a status other than 200
    Status(u16),

    /// No response could be obtained
    Transport,
}

/// One failed transfer, in completion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    pub failure: LinkFailure,
    pub url: String,
}

impl BrokenLink {
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self {
            failure: LinkFailure::Status(status),
            url: url.into(),
        }
    }

    pub fn transport(url: impl Into<String>) -> Self {
        Self {
            failure: LinkFailure::Transport,
            url: url.into(),
        }
    }
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failure {
            LinkFailure::Status(status) => write!(f, "HTTP {}: {}", status, self.url),
            LinkFailure::Transport => write!(f, "ERR: {}", self.url),
        }
    }
}

/// Everything a finished crawl produced
#[derive(Debug)]
pub struct CrawlReport {
    /// Seed URL the crawl started from
    pub seed: String,

    /// Wall-clock start of the crawl
    pub started_at: DateTime<Utc>,

    /// Time from the first fetch to loop exit
    pub elapsed: Duration,

    /// Transfers that ended in a response or a transport failure
    ///
    /// Transfers dropped unstarted after an interrupt are not counted.
    pub completed: usize,

    /// Broken links in completion order
    pub broken: Vec<BrokenLink>,

    /// Discovered link topology
    pub graph: CrawlGraph,

    /// Whether the crawl stopped on an external interrupt
    pub interrupted: bool,
}

impl CrawlReport {
    pub fn has_broken_links(&self) -> bool {
        !self.broken.is_empty()
    }
}
