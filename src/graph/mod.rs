//! Crawl graph
//!
//! The deduplicating store of discovered URLs (nodes) and page→link relations
//! (edges). It is the crawl's frontier record: a URL enters the graph the moment it
//! is first seen as a link target, before it is fetched, and is never removed.
//!
//! The graph is simple: parallel edges between the same pair collapse into one.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::io::{self, Write};

/// Directed link graph keyed by exact URL string
#[derive(Debug, Default)]
pub struct CrawlGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl CrawlGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the crawl root so that links back to it are not treated as new
    ///
    /// This is the one way besides [`add_edge`](Self::add_edge) that a node enters
    /// the graph. The seed is therefore counted by `node_count` even when nothing
    /// links to it, including a crawl whose only fetch failed.
    ///
    /// Returns true if the root was not already present.
    pub fn insert_root(&mut self, url: &str) -> bool {
        let before = self.graph.node_count();
        self.node(url);
        self.graph.node_count() > before
    }

    /// O(1) membership test
    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// Records that page `from` links to `to`
    ///
    /// Idempotent: inserts `to` (and `from`, if somehow absent) into the node set
    /// and the edge into the edge set only when missing.
    ///
    /// # Returns
    ///
    /// `true` if `to` had never been seen before this call
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let discovered = !self.contains(to);
        let source = self.node(from);
        let target = self.node(to);
        self.graph.update_edge(source, target, ());
        discovered
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Edges in insertion order as `(from, to)` pairs
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].as_str(),
                self.graph[edge.target()].as_str(),
            )
        })
    }

    /// Link targets of `url`, in the order the links were first recorded
    pub fn links_from(&self, url: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(url) else {
            return Vec::new();
        };

        // petgraph walks outgoing edges newest-first
        let mut targets: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect();
        targets.reverse();
        targets
    }

    /// Writes the graph to `sink` as a Graphviz `digraph`
    ///
    /// Every node is written as a quoted identifier, followed by one
    /// `"from" -> "to";` statement per edge, both in insertion order.
    pub fn export<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        writeln!(sink, "digraph crawl {{")?;
        for node in self.nodes() {
            writeln!(sink, "  \"{}\";", escape(node))?;
        }
        for (from, to) in self.edges() {
            writeln!(sink, "  \"{}\" -> \"{}\";", escape(from), escape(to))?;
        }
        writeln!(sink, "}}")
    }

    fn node(&mut self, url: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(url) {
            return idx;
        }
        let idx = self.graph.add_node(url.to_string());
        self.index.insert(url.to_string(), idx);
        idx
    }
}

fn escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}
