//! Graphviz DOT export
//!
//! The graph is written as `digraph crawl { ... }` with one quoted node per URL and
//! one `"from" -> "to";` statement per edge, headed by a comment recording when the
//! crawl started.

use crate::graph::CrawlGraph;
use crate::output::report::ExportError;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `graph` in DOT format to `out`
///
/// # Arguments
///
/// * `graph` - The crawl graph
/// * `started_at` - Crawl start time, recorded in the header comment
/// * `out` - Destination writer
pub fn write_dot<W: Write>(
    graph: &CrawlGraph,
    started_at: DateTime<Utc>,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out, "// crawl started {}", started_at.to_rfc3339())?;
    graph.export(out)
}

/// Writes `graph` to the file at `path`, replacing any existing file
///
/// # Returns
///
/// * `Ok(())` - The file was written completely
/// * `Err(ExportError)` - The file could not be created or written
pub fn export_graph(
    graph: &CrawlGraph,
    path: &Path,
    started_at: DateTime<Utc>,
) -> Result<(), ExportError> {
    let to_export_error = |source| ExportError::Write {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(to_export_error)?;
    let mut writer = BufWriter::new(file);
    write_dot(graph, started_at, &mut writer).map_err(to_export_error)?;
    writer.flush().map_err(to_export_error)?;

    tracing::debug!(
        "Exported {} nodes and {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(())
}
