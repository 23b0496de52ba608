//! URL handling
//!
//! Link normalization and the prefix test that confines a crawl to its seed.

mod normalize;

pub use normalize::{normalize_link, MIN_URL_LEN};

/// Returns true if `url` lies under the crawl's seed
///
/// Confinement is a literal string-prefix test: with a seed of
/// `https://example.com/foo`, pages under `https://example.com/bar` are out of scope.
///
/// # Examples
///
/// ```
/// use link_crawler::url::in_scope;
///
/// assert!(in_scope("https://example.com/docs/a", "https://example.com/docs/"));
/// assert!(!in_scope("https://example.com/blog/", "https://example.com/docs/"));
/// ```
pub fn in_scope(url: &str, seed: &str) -> bool {
    url.starts_with(seed)
}
