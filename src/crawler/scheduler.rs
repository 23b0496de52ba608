//! Admission control and connection limiting
//!
//! This module handles:
//! - The crawl-wide budget (`max_total`) and pending-transfer cap (`max_pending`)
//! - Global concurrency limiting via semaphores (`max_con`)
//! - Per-host connection limits (`max_host_con`)
//!
//! Admission decides *whether* a URL may be issued at all. The connection limiter
//! decides *when* an issued transfer may open a socket; transfers beyond the
//! connection limits stay pending until a permit frees up.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counters deciding whether new transfers may be issued
///
/// Every transfer issued through [`Admission::record_issued`] is either in flight
/// or completed, so `issued_total() == in_flight() + completed()` always holds.
#[derive(Debug, Clone)]
pub struct Admission {
    max_total: usize,
    max_pending: usize,
    in_flight: usize,
    completed: usize,
}

impl Admission {
    /// Creates an admission controller
    ///
    /// # Arguments
    ///
    /// * `max_total` - Lifetime cap on issued transfers
    /// * `max_pending` - Cap on transfers in flight at once
    pub fn new(max_total: usize, max_pending: usize) -> Self {
        Self {
            max_total,
            max_pending,
            in_flight: 0,
            completed: 0,
        }
    }

    /// Returns true if one more transfer may be issued right now
    ///
    /// Both caps must have room: `in_flight < max_pending` and
    /// `issued_total < max_total`. Issuing only while this holds keeps both
    /// counters within their caps for the whole crawl.
    pub fn may_schedule(&self) -> bool {
        self.in_flight < self.max_pending && self.issued_total() < self.max_total
    }

    /// Records a transfer handed to the fetch engine
    pub fn record_issued(&mut self) {
        self.in_flight += 1;
    }

    /// Records a transfer retired by the fetch engine
    pub fn record_completed(&mut self) {
        if self.in_flight == 0 {
            tracing::warn!("Completion recorded with no transfer in flight");
            return;
        }
        self.in_flight -= 1;
        self.completed += 1;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Transfers issued over the lifetime of the crawl
    pub fn issued_total(&self) -> usize {
        self.in_flight + self.completed
    }

    /// Returns true once no further transfer can ever be admitted
    pub fn budget_exhausted(&self) -> bool {
        self.issued_total() >= self.max_total
    }
}

/// Permits held by a transfer for as long as its connection is open
pub struct ConnectionPermit {
    _host: OwnedSemaphorePermit,
    _global: OwnedSemaphorePermit,
}

/// Global and per-host connection limits shared by all transfers
///
/// Per-host semaphores are created lazily the first time a host is seen.
pub struct ConnectionLimiter {
    /// Global semaphore for limiting open connections
    global: Arc<Semaphore>,

    /// Per-host semaphores, keyed by host name
    per_host: Mutex<HashMap<String, Arc<Semaphore>>>,

    max_host_con: usize,
}

impl ConnectionLimiter {
    /// Creates a limiter
    ///
    /// # Arguments
    ///
    /// * `max_con` - Connections open at once across all hosts
    /// * `max_host_con` - Connections open at once to any single host
    pub fn new(max_con: usize, max_host_con: usize) -> Self {
        Self {
            global: Arc::new(Semaphore::new(max_con)),
            per_host: Mutex::new(HashMap::new()),
            max_host_con,
        }
    }

    /// Waits until a connection to `host` may be opened
    ///
    /// The host permit is taken before the global one, so a transfer queued
    /// behind a busy host never holds a global slot another host could use.
    ///
    /// # Returns
    ///
    /// * `Some(ConnectionPermit)` - The connection may proceed; drop to release
    /// * `None` - A semaphore was closed
    pub async fn acquire(&self, host: &str) -> Option<ConnectionPermit> {
        let host_semaphore = self.host_semaphore(host)?;
        let host_permit = host_semaphore.acquire_owned().await.ok()?;
        let global_permit = self.global.clone().acquire_owned().await.ok()?;

        Some(ConnectionPermit {
            _host: host_permit,
            _global: global_permit,
        })
    }

    /// Connections that may still be opened across all hosts
    #[cfg(test)]
    pub(crate) fn available(&self) -> usize {
        self.global.available_permits()
    }

    fn host_semaphore(&self, host: &str) -> Option<Arc<Semaphore>> {
        let mut per_host = self.per_host.lock().ok()?;
        let semaphore = per_host
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.max_host_con)));
        Some(semaphore.clone())
    }
}
