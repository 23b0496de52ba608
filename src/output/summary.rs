//! Console summary of a finished crawl

use crate::graph::CrawlGraph;
use crate::output::report::CrawlReport;

/// Formats the broken-link summary printed after a crawl
///
/// # Returns
///
/// Either a `Summary: <broken>/<completed> links are broken.` header followed by
/// one indented line per broken link, or a single line stating how many links were
/// checked.
pub fn format_summary(report: &CrawlReport) -> String {
    let mut out = String::new();

    if report.interrupted {
        out.push_str("Crawl interrupted; results are partial.\n");
    }

    if report.has_broken_links() {
        out.push_str(&format!(
            "Summary: {}/{} links are broken.\n",
            report.broken.len(),
            report.completed
        ));
        for link in &report.broken {
            out.push_str(&format!("  {}\n", link));
        }
    } else {
        out.push_str(&format!(
            "Summary: checked {} links, no broken links found.\n",
            report.graph.node_count()
        ));
    }

    out
}

/// Prints the broken-link summary to stdout
pub fn print_summary(report: &CrawlReport) {
    println!();
    print!("{}", format_summary(report));
}

/// Formats the graph as an adjacency list, one source page per block
///
/// Nodes without outgoing links are omitted.
pub fn format_adjacency(graph: &CrawlGraph) -> String {
    let mut out = String::new();

    for node in graph.nodes() {
        let targets = graph.links_from(node);
        if targets.is_empty() {
            continue;
        }
        out.push_str(node);
        out.push('\n');
        for target in targets {
            out.push_str(&format!("  -> {}\n", target));
        }
    }

    out
}

/// Prints the adjacency list to stdout
pub fn print_graph(graph: &CrawlGraph) {
    println!();
    print!("{}", format_adjacency(graph));
    println!();
}
