//! Fetch engine
//!
//! This module owns every in-flight transfer, including:
//! - Building the HTTP client with the crawl's transfer policy
//! - Spawning one task per transfer, gated by the connection limiter
//! - Polling for completions with a bounded wait
//! - Classifying transport errors
//!
//! A transfer's task, and with it the response buffer, belongs to the engine until
//! it is returned from [`Fetcher::poll`]. Dropping the engine aborts whatever is
//! still running.
//!
//! Once the crawl's cancellation token fires, transfers still waiting for a
//! connection slot give up instead of starting. Transfers that hold a slot run to
//! completion, so draining takes at most one transfer timeout.

use crate::config::{CrawlConfig, HttpConfig};
use crate::crawler::scheduler::ConnectionLimiter;
use reqwest::{header, redirect::Policy, Client};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Outcome of one transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A response was received (any status)
    Success {
        /// HTTP status code of the final response
        status: u16,
        /// Content-Type header value
        content_type: Option<String>,
        /// Response body
        body: Vec<u8>,
    },

    /// No response could be obtained
    TransportFailure {
        /// Error description
        error: String,
    },

    /// The crawl was cancelled before the transfer got a connection slot
    Cancelled,
}

/// A finished transfer handed to the crawl controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Effective URL: the final URL after redirects, or the requested URL if no
    /// response was received
    pub url: String,

    /// URL the transfer was issued for
    pub requested: String,

    pub outcome: FetchOutcome,
}

impl Completion {
    pub fn success(
        requested: impl Into<String>,
        effective: impl Into<String>,
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            url: effective.into(),
            requested: requested.into(),
            outcome: FetchOutcome::Success {
                status,
                content_type,
                body,
            },
        }
    }

    pub fn transport_failure(requested: impl Into<String>, error: impl Into<String>) -> Self {
        let requested = requested.into();
        Self {
            url: requested.clone(),
            requested,
            outcome: FetchOutcome::TransportFailure {
                error: error.into(),
            },
        }
    }

    pub fn cancelled(requested: impl Into<String>) -> Self {
        let requested = requested.into();
        Self {
            url: requested.clone(),
            requested,
            outcome: FetchOutcome::Cancelled,
        }
    }
}

/// Returns true if a Content-Type header announces an HTML document
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

/// The set of in-flight transfers, as seen by the crawl controller
pub trait Fetcher {
    /// Starts a transfer for `url`
    fn issue(&mut self, url: &str);

    /// Number of transfers issued but not yet returned from `poll`
    fn in_flight(&self) -> usize;

    /// Waits up to `wait` for transfers to finish and returns every completion
    /// that is ready
    ///
    /// Returns an empty list on timeout or when nothing is in flight.
    fn poll(&mut self, wait: Duration) -> impl Future<Output = Vec<Completion>>;
}

/// Builds an HTTP client with the crawl's transfer policy
///
/// # Arguments
///
/// * `config` - Timeouts, redirect cap, and user agent
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use link_crawler::config::HttpConfig;
/// use link_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .redirect(Policy::limited(config.max_redirects))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and reports the outcome as a completion
///
/// Every response is a success at this layer, whatever its status; only the
/// absence of a response is a transport failure.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> Completion {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return Completion::transport_failure(url, classify_error(&e)),
    };

    let status = response.status().as_u16();
    let effective_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match response.bytes().await {
        Ok(body) => Completion::success(url, effective_url, status, content_type, body.to_vec()),
        Err(e) => Completion::transport_failure(url, classify_error(&e)),
    }
}

fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection failed".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else {
        error.to_string()
    }
}

/// Fetch engine backed by reqwest, one tokio task per transfer
pub struct HttpFetcher {
    client: Client,
    limiter: Arc<ConnectionLimiter>,
    cancel: CancellationToken,
    transfers: JoinSet<Completion>,

    /// Requested URL per running task, so a task that dies still yields a completion
    pending: HashMap<Id, String>,
}

impl HttpFetcher {
    /// Creates a fetch engine for a crawl
    ///
    /// # Arguments
    ///
    /// * `config` - Transfer policy and connection caps
    /// * `cancel` - Once cancelled, queued transfers complete without starting
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Ready to issue transfers
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(config: &CrawlConfig, cancel: CancellationToken) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.http)?;
        Ok(Self::with_client(
            client,
            ConnectionLimiter::new(config.max_con, config.max_host_con),
            cancel,
        ))
    }

    pub fn with_client(
        client: Client,
        limiter: ConnectionLimiter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            limiter: Arc::new(limiter),
            cancel,
            transfers: JoinSet::new(),
            pending: HashMap::new(),
        }
    }

    fn settle(&mut self, joined: Result<(Id, Completion), JoinError>) -> Completion {
        match joined {
            Ok((id, completion)) => {
                self.pending.remove(&id);
                completion
            }
            Err(e) => {
                let url = self.pending.remove(&e.id()).unwrap_or_default();
                tracing::error!("Transfer task for {} failed: {}", url, e);
                Completion::transport_failure(url, format!("transfer task failed: {}", e))
            }
        }
    }
}

impl Fetcher for HttpFetcher {
    fn issue(&mut self, url: &str) {
        let client = self.client.clone();
        let limiter = self.limiter.clone();
        let cancel = self.cancel.clone();
        let target = url.to_string();

        let handle = self.transfers.spawn(async move {
            let host = Url::parse(&target)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();

            // a free slot is taken even after cancellation; only waiting gives up
            let permit = tokio::select! {
                biased;
                permit = limiter.acquire(&host) => permit,
                _ = cancel.cancelled() => return Completion::cancelled(target),
            };
            let Some(_permit) = permit else {
                return Completion::transport_failure(target, "connection limiter closed");
            };

            fetch_url(&client, &target).await
        });

        self.pending.insert(handle.id(), url.to_string());
        tracing::trace!("Issued transfer for {}", url);
    }

    fn in_flight(&self) -> usize {
        self.transfers.len()
    }

    async fn poll(&mut self, wait: Duration) -> Vec<Completion> {
        let mut completions = Vec::new();

        match tokio::time::timeout(wait, self.transfers.join_next_with_id()).await {
            Ok(Some(joined)) => {
                let completion = self.settle(joined);
                completions.push(completion);
            }
            Ok(None) => return completions,
            Err(_) => {
                tracing::trace!(
                    "No completions within {:?}, {} in flight",
                    wait,
                    self.transfers.len()
                );
                return completions;
            }
        }

        while let Some(joined) = self.transfers.try_join_next_with_id() {
            let completion = self.settle(joined);
            completions.push(completion);
        }

        completions
    }
}
