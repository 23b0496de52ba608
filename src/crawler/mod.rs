//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Admission control and connection limiting
//! - The fetch engine and its completion queue
//! - HTML parsing and link extraction
//! - The event loop that coordinates a crawl

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, MIN_HTML_BODY};
pub use fetcher::{
    build_http_client, fetch_url, is_html, Completion, FetchOutcome, Fetcher, HttpFetcher,
};
pub use parser::{LinkExtractor, ParsedPage};
pub use scheduler::{Admission, ConnectionLimiter, ConnectionPermit};
