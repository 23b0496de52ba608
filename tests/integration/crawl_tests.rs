//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against the reqwest fetch engine.

use link_crawler::config::CrawlConfig;
use link_crawler::output::{export_graph, BrokenLink, LinkFailure};
use link_crawler::{run_crawl, Coordinator};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTML page with the given anchors, long enough to be scanned for links
fn html_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        r#"<html><head><title>{}</title></head><body>
        <p>Test page content that is long enough to be scanned for links.</p>
        {}
        </body></html>"#,
        title, anchors
    )
}

fn html_response(title: &str, links: &[&str]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(html_page(title, links), "text/html; charset=utf-8")
}

/// Creates a test configuration seeded at the mock server's root
fn create_test_config(mock_server: &MockServer) -> CrawlConfig {
    let mut config = CrawlConfig::new(format!("{}/", mock_server.uri()));
    config.poll_interval = Duration::from_millis(200);
    config
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            "Home",
            &["/page1", "/page2", "/missing", "http://other.invalid/page"],
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_response("Page 1", &["/", "/page2"]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html_response("Page 2", &["/page1"]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let seed = config.seed.clone();
    let report = run_crawl(config, CancellationToken::new())
        .await
        .expect("crawl failed");

    assert_eq!(report.completed, 4);
    assert_eq!(
        report.broken,
        vec![BrokenLink::status(404, format!("{}missing", seed))]
    );
    assert!(report.graph.contains("http://other.invalid/page"));
    assert_eq!(report.graph.node_count(), 5);
    // root->page1, page2, missing, other; page1->root, page2; page2->page1
    assert_eq!(report.graph.edge_count(), 7);
    assert!(!report.interrupted);
}

#[tokio::test]
async fn test_no_broken_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home", &["/about"]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_response("About", &[]))
        .mount(&mock_server)
        .await;

    let report = run_crawl(create_test_config(&mock_server), CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.has_broken_links());
    assert_eq!(report.completed, 2);
}

#[tokio::test]
async fn test_redirect_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home", &["/old"]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_response("New", &["/old"]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = run_crawl(create_test_config(&mock_server), CancellationToken::new())
        .await
        .unwrap();

    assert!(report.broken.is_empty());
    assert_eq!(report.completed, 2);
    // links on the redirect target are recorded against its final URL
    assert_eq!(
        report.graph.links_from(&format!("{}/new", base_url)),
        vec![format!("{}/old", base_url).as_str()]
    );
}

#[tokio::test]
async fn test_redirect_loop_is_transport_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home", &["/loop-a"]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/loop-a"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/loop-b", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/loop-b"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/loop-a", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    let report = run_crawl(create_test_config(&mock_server), CancellationToken::new())
        .await
        .unwrap();
    assert!(report.broken.is_empty());
    assert_eq!(report.completed, 2);

    let mut config = create_test_config(&mock_server);
    config.record_transport_failures = true;
    let report = run_crawl(config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.broken.len(), 1);
    assert_eq!(report.broken[0].failure, LinkFailure::Transport);
    assert_eq!(report.broken[0].url, format!("{}/loop-a", base_url));
}

#[tokio::test]
async fn test_request_budget_respected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home", &["/a", "/b", "/c"]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_response("A", &[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_response("B", &[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.max_total = 2;

    let report = run_crawl(config, CancellationToken::new()).await.unwrap();
    assert_eq!(report.completed, 2);
}

#[tokio::test]
async fn test_non_html_not_expanded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("Data", &["/hidden"]), "application/json"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html_response("Hidden", &[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = run_crawl(create_test_config(&mock_server), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(report.graph.node_count(), 1);
}

#[tokio::test]
async fn test_interrupted_crawl_drains_seed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home", &["/a"]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_response("A", &[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let coordinator = Coordinator::new(create_test_config(&mock_server), cancel).unwrap();
    let report = coordinator.run().await;

    assert!(report.interrupted);
    assert_eq!(report.completed, 1);
}

#[tokio::test]
async fn test_interrupt_skips_transfers_queued_behind_host_limit() {
    let mock_server = MockServer::start().await;
    let links: Vec<String> = (0..8).map(|i| format!("/slow{}", i)).collect();
    let links: Vec<&str> = links.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home", &links))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/slow[0-9]$"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(1500)))
        .expect(1..=2)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.max_host_con = 1;
    config.http.timeout = Duration::from_secs(2);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let report = run_crawl(config, cancel).await.unwrap();
    let elapsed = started.elapsed();

    // only the transfer already on the wire is waited for
    assert!(elapsed < Duration::from_secs(4), "drain took {:?}", elapsed);
    assert!(report.interrupted);
    assert!(report.completed <= 3);
    assert!(report.broken.len() <= 2);
}

#[tokio::test]
async fn test_graph_export() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("Home", &["/page1"]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_response("Page 1", &[]))
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("out.gv");

    let report = run_crawl(create_test_config(&mock_server), CancellationToken::new())
        .await
        .unwrap();
    export_graph(&report.graph, &output, report.started_at).unwrap();

    let dot = std::fs::read_to_string(&output).unwrap();
    assert!(dot.contains("digraph crawl {"));
    assert!(dot.contains(&format!(
        "\"{}/\" -> \"{}/page1\";",
        base_url, base_url
    )));
}
