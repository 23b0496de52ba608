//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the event loop that drives a crawl:
//! - Issuing the seed and every admitted discovery to the fetch engine
//! - Classifying completions into successes and broken links
//! - Expanding HTML pages into graph edges and new fetches
//! - Draining in-flight transfers after an interrupt or once the budget is spent
//!
//! All crawl state (graph, admission counters, broken links) is owned by the
//! coordinator and mutated only from its loop, so none of it needs locking.

use crate::config::{validate, CrawlConfig};
use crate::crawler::fetcher::{is_html, Completion, FetchOutcome, Fetcher, HttpFetcher};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::scheduler::Admission;
use crate::graph::CrawlGraph;
use crate::output::{BrokenLink, CrawlReport};
use crate::state::CrawlPhase;
use crate::url::in_scope;
use chrono::Utc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Pages whose body is this size or smaller are not scanned for links
pub const MIN_HTML_BODY: usize = 100;

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher = HttpFetcher> {
    config: CrawlConfig,
    fetcher: F,
    graph: CrawlGraph,
    admission: Admission,
    extractor: LinkExtractor,
    broken: Vec<BrokenLink>,
    phase: CrawlPhase,
    cancel: CancellationToken,
    interrupted: bool,

    /// Transfers the engine dropped unstarted after an interrupt
    cancelled: usize,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator backed by the reqwest fetch engine
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `cancel` - Cancelled to stop issuing new fetches
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The HTTP client could not be built
    pub fn new(config: CrawlConfig, cancel: CancellationToken) -> crate::Result<Self> {
        let fetcher = HttpFetcher::new(&config, cancel.clone())?;
        Ok(Self::with_fetcher(config, fetcher, cancel))
    }
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator driving an arbitrary fetch engine
    pub fn with_fetcher(config: CrawlConfig, fetcher: F, cancel: CancellationToken) -> Self {
        let admission = Admission::new(config.max_total, config.max_pending);
        let extractor = LinkExtractor::new(
            config.seed.clone(),
            config.max_link_per_page,
            config.follow_relative_links,
        );

        Self {
            config,
            fetcher,
            graph: CrawlGraph::new(),
            admission,
            extractor,
            broken: Vec::new(),
            phase: CrawlPhase::default(),
            cancel,
            interrupted: false,
            cancelled: 0,
        }
    }

    /// Runs the crawl to completion
    ///
    /// The loop ends when no transfer is in flight. An interrupt or an exhausted
    /// budget moves the crawl to draining: transfers already issued still complete
    /// and are classified, but no page is expanded any more.
    pub async fn run(mut self) -> CrawlReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let seed = self.config.seed.clone();

        tracing::info!("Starting crawl at {}", seed);
        self.graph.insert_root(&seed);
        if self.admission.may_schedule() {
            self.issue(&seed);
        }

        loop {
            self.check_phase();

            if self.fetcher.in_flight() == 0 {
                tracing::debug!("No transfers in flight, crawl complete");
                break;
            }

            let completions = self.fetcher.poll(self.config.poll_interval).await;
            tracing::trace!(
                "Poll returned {} completions ({} in flight, phase {})",
                completions.len(),
                self.fetcher.in_flight(),
                self.phase
            );

            for completion in completions {
                self.handle_completion(completion);
            }
        }

        self.phase.advance(CrawlPhase::Terminated);
        let elapsed = clock.elapsed();
        let completed = self.checked();

        if self.cancelled > 0 {
            tracing::info!("{} queued transfers were never started", self.cancelled);
        }
        tracing::info!(
            "Crawl finished: {} completed, {} broken, {} links, {} edges in {:.3}s",
            completed,
            self.broken.len(),
            self.graph.node_count(),
            self.graph.edge_count(),
            elapsed.as_secs_f64()
        );

        CrawlReport {
            seed,
            started_at,
            elapsed,
            completed,
            broken: self.broken,
            graph: self.graph,
            interrupted: self.interrupted,
        }
    }

    /// Moves to draining on interrupt or once no transfer can be admitted
    fn check_phase(&mut self) {
        if !self.interrupted && self.cancel.is_cancelled() {
            self.interrupted = true;
            if self.phase.advance(CrawlPhase::Draining) {
                tracing::info!(
                    "Interrupted, draining {} in-flight transfers",
                    self.fetcher.in_flight()
                );
            }
        }

        if self.phase.accepts_work() && self.admission.budget_exhausted() {
            self.phase.advance(CrawlPhase::Draining);
            tracing::info!(
                "Request budget of {} exhausted, draining {} in-flight transfers",
                self.config.max_total,
                self.fetcher.in_flight()
            );
        }
    }

    /// Transfers that produced a response or a transport failure
    fn checked(&self) -> usize {
        self.admission.completed() - self.cancelled
    }

    fn handle_completion(&mut self, completion: Completion) {
        self.admission.record_completed();
        let Completion {
            url,
            requested,
            outcome,
        } = completion;

        if outcome == FetchOutcome::Cancelled {
            self.cancelled += 1;
            tracing::debug!("Transfer for {} cancelled before it started", url);
            return;
        }

        let count = self.checked();
        if url != requested {
            tracing::debug!("[{}] {} redirected to {}", count, requested, url);
        }

        match outcome {
            FetchOutcome::TransportFailure { error } => {
                tracing::info!("[{}] Connection failure: {}", count, url);
                tracing::debug!("Transport error for {}: {}", url, error);
                if self.config.record_transport_failures {
                    self.broken.push(BrokenLink::transport(url));
                }
            }
            FetchOutcome::Success { status, .. } if status != 200 => {
                tracing::info!("[{}] HTTP {}: {}", count, status, url);
                self.broken.push(BrokenLink::status(status, url));
            }
            FetchOutcome::Success {
                content_type, body, ..
            } => {
                tracing::info!(
                    "[{}] HTTP 200 ({}): {}",
                    count,
                    content_type.as_deref().unwrap_or(""),
                    url
                );

                if !is_html(content_type.as_deref()) || body.len() <= MIN_HTML_BODY {
                    return;
                }
                if !self.phase.accepts_work() || !self.admission.may_schedule() {
                    tracing::debug!("Not expanding {} ({})", url, self.phase);
                    return;
                }

                self.expand(&url, &body);
            }
            FetchOutcome::Cancelled => {}
        }
    }

    /// Records every link on a page and schedules the new, in-scope, admitted ones
    fn expand(&mut self, source: &str, body: &[u8]) {
        let Some(page) = self.extractor.parse(body, source) else {
            return;
        };

        let mut scheduled = 0;
        for link in page.links() {
            if !self.graph.add_edge(source, &link) {
                continue;
            }

            if !in_scope(&link, &self.config.seed) {
                tracing::debug!("Not following out-of-scope link {}", link);
                continue;
            }

            if !self.admission.may_schedule() {
                tracing::debug!("Admission denied for {}", link);
                continue;
            }

            self.issue(&link);
            scheduled += 1;
        }

        tracing::debug!("Expanded {}: {} new fetches", source, scheduled);
    }

    fn issue(&mut self, url: &str) {
        self.fetcher.issue(url);
        self.admission.record_issued();
    }
}

/// Runs a complete crawl against the network
///
/// This is the main entry point for a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client and fetch engine
/// 3. Fetch the seed and every admitted in-scope discovery
/// 4. Return the report once nothing is in flight
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `cancel` - Cancelled to stop issuing new fetches
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran (broken links are part of the report)
/// * `Err(CrawlError)` - The crawl could not start
///
/// # Example
///
/// ```no_run
/// use link_crawler::{run_crawl, CrawlConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CrawlConfig::new("https://example.com/");
/// let report = run_crawl(config, CancellationToken::new()).await?;
/// println!("{} broken links", report.broken.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig, cancel: CancellationToken) -> crate::Result<CrawlReport> {
    validate(&config)?;
    let coordinator = Coordinator::new(config, cancel)?;
    Ok(coordinator.run().await)
}
