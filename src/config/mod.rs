//! Configuration module
//!
//! The crawl engine consumes a [`CrawlConfig`]. It starts from built-in defaults,
//! may be overlaid with an optional TOML file, and finally with explicit
//! command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use link_crawler::config::{load_config, validate, CrawlConfig};
//! use std::path::Path;
//!
//! let mut config = CrawlConfig::new("https://example.com/");
//! config.apply_file(&load_config(Path::new("crawl.toml")).unwrap());
//! validate(&config).unwrap();
//! println!("Crawl will issue at most {} requests", config.max_total);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerSection, FileConfig, HttpConfig, HttpSection, OutputSection,
    DEFAULT_MAX_CON, DEFAULT_MAX_HOST_CON, DEFAULT_MAX_LINK_PER_PAGE, DEFAULT_MAX_PENDING,
    DEFAULT_MAX_TOTAL, DEFAULT_OUTPUT, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
