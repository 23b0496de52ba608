//! HTML link extraction
//!
//! Pages are parsed permissively (html5ever never rejects markup), every `<a href>`
//! is normalized in document order, and at most `max_links_per_page` accepted links
//! are yielded per page. Pages outside the seed's prefix are never parsed.

use crate::url::{in_scope, normalize_link};
use scraper::{ElementRef, Html};
use url::Url;

/// Extraction policy shared by every page of a crawl
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    seed: String,
    max_links_per_page: usize,
    follow_relative: bool,
}

/// A parsed, in-scope HTML page ready for link extraction
pub struct ParsedPage {
    document: Html,
    base: Url,
    max_links: usize,
    follow_relative: bool,
}

impl LinkExtractor {
    pub fn new(seed: impl Into<String>, max_links_per_page: usize, follow_relative: bool) -> Self {
        Self {
            seed: seed.into(),
            max_links_per_page,
            follow_relative,
        }
    }

    /// Parses `body` as the page found at `source_url`
    ///
    /// The scope gate runs first: a page whose URL does not start with the seed is
    /// skipped without parsing.
    ///
    /// # Returns
    ///
    /// * `Some(ParsedPage)` - The page is in scope and its URL is absolute
    /// * `None` - Out of scope, or `source_url` cannot serve as a base URL
    pub fn parse(&self, body: &[u8], source_url: &str) -> Option<ParsedPage> {
        if !in_scope(source_url, &self.seed) {
            tracing::debug!("Not extracting links from out-of-scope page {}", source_url);
            return None;
        }

        let base = Url::parse(source_url).ok()?;
        let html = String::from_utf8_lossy(body);

        Some(ParsedPage {
            document: Html::parse_document(&html),
            base,
            max_links: self.max_links_per_page,
            follow_relative: self.follow_relative,
        })
    }

    /// Collects every accepted link of a page
    #[cfg(test)]
    pub(crate) fn extract(&self, body: &[u8], source_url: &str) -> Vec<String> {
        self.parse(body, source_url)
            .map(|page| page.links().collect())
            .unwrap_or_default()
    }
}

impl ParsedPage {
    /// Normalized link targets in document order, capped at the per-page maximum
    ///
    /// The iterator is lazy: hrefs past the cap are never normalized.
    pub fn links(&self) -> impl Iterator<Item = String> + '_ {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name() == "a")
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| normalize_link(href, &self.base, self.follow_relative))
            .take(self.max_links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "https://example.com/";

    fn extractor() -> LinkExtractor {
        LinkExtractor::new(SEED, 20, true)
    }

    #[test]
    fn test_links_in_document_order() {
        let html = r#"<html><body>
            <a href="/first">1</a>
            <p><a href="/second">2</a></p>
            <nav><a href="https://example.com/third">3</a></nav>
        </body></html>"#;

        let links = extractor().extract(html.as_bytes(), "https://example.com/index");
        assert_eq!(
            links,
            vec![
                "https://example.com/first",
                "https://example.com/second",
                "https://example.com/third"
            ]
        );
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<a name="top">Top</a><a href="/page">Page</a>"#;
        let links = extractor().extract(html.as_bytes(), SEED);
        assert_eq!(links, vec!["https://example.com/page"]);
    }

    #[test]
    fn test_only_anchors_considered() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/style.css">
            <link rel="canonical" href="https://example.com/canonical">
            <script src="/app.js"></script>
        </head><body><img src="/logo.png"><a href="/real-link">x</a></body></html>"#;

        let links = extractor().extract(html.as_bytes(), SEED);
        assert_eq!(links, vec!["https://example.com/real-link"]);
    }

    #[test]
    fn test_rejected_links_skipped() {
        let html = r#"
            <a href="mailto:someone@example.com">mail</a>
            <a href="javascript:void(0)">js</a>
            <a href="/ok">ok</a>
            <a href="http://a.io">short</a>
        "#;

        let links = extractor().extract(html.as_bytes(), SEED);
        assert_eq!(links, vec!["https://example.com/ok"]);
    }

    #[test]
    fn test_off_origin_links_still_extracted() {
        let html = r#"<a href="/a">a</a><a href="http://other.com/page">other</a>"#;
        let links = extractor().extract(html.as_bytes(), SEED);
        assert_eq!(
            links,
            vec!["https://example.com/a", "http://other.com/page"]
        );
    }

    #[test]
    fn test_per_page_cap() {
        let mut html = String::from("<html><body>");
        for i in 0..50 {
            html.push_str(&format!(r#"<a href="/page{}">p</a>"#, i));
        }
        html.push_str("</body></html>");

        let extractor = LinkExtractor::new(SEED, 20, true);
        let links = extractor.extract(html.as_bytes(), SEED);

        assert_eq!(links.len(), 20);
        assert_eq!(links[0], "https://example.com/page0");
        assert_eq!(links[19], "https://example.com/page19");
    }

    #[test]
    fn test_cap_counts_accepted_links_only() {
        let html = r#"
            <a href="mailto:a@example.com">x</a>
            <a href="/one">1</a>
            <a href="tel:+100000000000000000">x</a>
            <a href="/two">2</a>
            <a href="/three">3</a>
        "#;

        let extractor = LinkExtractor::new(SEED, 2, true);
        let links = extractor.extract(html.as_bytes(), SEED);
        assert_eq!(
            links,
            vec!["https://example.com/one", "https://example.com/two"]
        );
    }

    #[test]
    fn test_out_of_scope_page_not_parsed() {
        let html = r#"<a href="/page">p</a>"#;
        let extractor = LinkExtractor::new("https://example.com/docs/", 20, true);

        assert!(extractor
            .parse(html.as_bytes(), "https://example.com/blog/")
            .is_none());
        assert!(extractor
            .extract(html.as_bytes(), "http://other.com/docs/")
            .is_empty());
    }

    #[test]
    fn test_malformed_html_tolerated() {
        let html = r#"<html><body><div><a href="/ok">unclosed <p><a href="/also-ok"<b></body>"#;
        let links = extractor().extract(html.as_bytes(), SEED);
        assert!(links.contains(&"https://example.com/ok".to_string()));
    }

    #[test]
    fn test_binary_garbage_yields_nothing() {
        let body: Vec<u8> = (0u8..=255).cycle().take(2048).collect();
        let links = extractor().extract(&body, SEED);
        assert!(links.is_empty());
    }

    #[test]
    fn test_verbatim_mode() {
        let html = r#"<a href="/relative">r</a><a href="https://example.com/absolute">a</a>"#;
        let extractor = LinkExtractor::new(SEED, 20, false);
        let links = extractor.extract(html.as_bytes(), SEED);
        assert_eq!(links, vec!["https://example.com/absolute"]);
    }

    #[test]
    fn test_links_iterator_is_lazy_and_bounded() {
        let html = r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>"#;
        let page = extractor().parse(html.as_bytes(), SEED).unwrap();

        let mut links = page.links();
        assert_eq!(links.next().as_deref(), Some("https://example.com/a"));
        assert_eq!(links.count(), 2);
    }
}
