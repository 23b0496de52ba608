//! Output module for reporting crawl results
//!
//! This module handles:
//! - The crawl report and broken-link records
//! - Console summaries and the adjacency dump
//! - Exporting the link graph in Graphviz DOT format

mod dot;
mod report;
mod summary;

pub use dot::{export_graph, write_dot};
pub use report::{BrokenLink, CrawlReport, ExportError, LinkFailure};
pub use summary::{format_adjacency, format_summary, print_graph, print_summary};
