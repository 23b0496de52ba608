use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_CON: usize = 200;
pub const DEFAULT_MAX_HOST_CON: usize = 6;
pub const DEFAULT_MAX_TOTAL: usize = 20000;
pub const DEFAULT_MAX_PENDING: usize = 500;
pub const DEFAULT_MAX_LINK_PER_PAGE: usize = 20;
pub const DEFAULT_OUTPUT: &str = "out.gv";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4292.0 Safari/537.36";

/// Runtime configuration consumed by the crawl engine
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Seed URL; also the literal prefix that confines the crawl
    pub seed: String,

    /// Maximum simultaneously open transfers across all hosts
    pub max_con: usize,

    /// Maximum simultaneously open transfers to a single host
    pub max_host_con: usize,

    /// Lifetime cap on requests issued
    pub max_total: usize,

    /// Cap on concurrently outstanding requests
    pub max_pending: usize,

    /// Maximum number of links followed from one page
    pub max_link_per_page: usize,

    /// Resolve hrefs against the page URL (otherwise hrefs are taken verbatim)
    pub follow_relative_links: bool,

    /// Record transport failures as broken links
    pub record_transport_failures: bool,

    /// Graph export path
    pub output: PathBuf,

    /// Transfer policy
    pub http: HttpConfig,

    /// Upper bound on one wait for completions
    pub poll_interval: Duration,
}

/// Per-transfer HTTP policy
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(5),
            max_redirects: 3,
        }
    }
}

impl CrawlConfig {
    /// Creates a configuration for `seed` with every other knob at its default
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            max_con: DEFAULT_MAX_CON,
            max_host_con: DEFAULT_MAX_HOST_CON,
            max_total: DEFAULT_MAX_TOTAL,
            max_pending: DEFAULT_MAX_PENDING,
            max_link_per_page: DEFAULT_MAX_LINK_PER_PAGE,
            follow_relative_links: true,
            record_transport_failures: false,
            output: PathBuf::from(DEFAULT_OUTPUT),
            http: HttpConfig::default(),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Overlays every key present in a config file onto this configuration
    pub fn apply_file(&mut self, file: &FileConfig) {
        let crawler = &file.crawler;
        if let Some(v) = crawler.max_con {
            self.max_con = v;
        }
        if let Some(v) = crawler.max_host_con {
            self.max_host_con = v;
        }
        if let Some(v) = crawler.max_total {
            self.max_total = v;
        }
        if let Some(v) = crawler.max_requests {
            self.max_pending = v;
        }
        if let Some(v) = crawler.max_link_per_page {
            self.max_link_per_page = v;
        }
        if let Some(v) = crawler.follow_relative_links {
            self.follow_relative_links = v;
        }
        if let Some(v) = crawler.record_transport_failures {
            self.record_transport_failures = v;
        }

        let http = &file.http;
        if let Some(ua) = &http.user_agent {
            self.http.user_agent = ua.clone();
        }
        if let Some(secs) = http.connect_timeout {
            self.http.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = http.timeout {
            self.http.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = http.max_redirects {
            self.http.max_redirects = v;
        }

        if let Some(path) = &file.output.graph_path {
            self.output = path.clone();
        }
    }
}

/// Contents of an optional TOML configuration file
///
/// Every table and key is optional; anything absent keeps its default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub crawler: CrawlerSection,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// `[crawler]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerSection {
    #[serde(rename = "max-con")]
    pub max_con: Option<usize>,

    #[serde(rename = "max-host-con")]
    pub max_host_con: Option<usize>,

    #[serde(rename = "max-total")]
    pub max_total: Option<usize>,

    #[serde(rename = "max-requests")]
    pub max_requests: Option<usize>,

    #[serde(rename = "max-link-per-page")]
    pub max_link_per_page: Option<usize>,

    #[serde(rename = "follow-relative-links")]
    pub follow_relative_links: Option<bool>,

    #[serde(rename = "record-transport-failures")]
    pub record_transport_failures: Option<bool>,
}

/// `[http]` table; timeouts are in seconds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpSection {
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    #[serde(rename = "connect-timeout")]
    pub connect_timeout: Option<u64>,

    pub timeout: Option<u64>,

    #[serde(rename = "max-redirects")]
    pub max_redirects: Option<usize>,
}

/// `[output]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    #[serde(rename = "graph-path")]
    pub graph_path: Option<PathBuf>,
}
