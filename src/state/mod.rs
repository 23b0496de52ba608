//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: lifecycle of the crawl event loop (running, draining, terminated)

mod phase;

pub use phase::CrawlPhase;
