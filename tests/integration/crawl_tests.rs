//! Integration tests for the crawler
//!
//! These tests use wiremock to stand up both the site under crawl and the
//! embedding service, and run the full fetch, extract, chunk and deliver cycle
//! end-to-end over HTTP.

use chunk_crawler::config::{
    ChunkingConfig, Config, CrawlerConfig, OutputConfig, ScopeConfig, SinkConfig, UserAgentConfig,
};
use chunk_crawler::crawler::Coordinator;
use chunk_crawler::output::write_results;
use chunk_crawler::state::{CrawlPhase, PageState};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration scoped to the mock site
///
/// Scope is a regex over the site's origin so that other mock servers on the
/// same loopback host stay out of scope.
fn create_test_config(site_url: &str, max_depth: u32, sink_endpoint: Option<String>) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            max_concurrent_pages_open: 1,
            minimum_time_on_page: 10, // Very short for testing
            request_timeout: 5_000,
            max_run_seconds: 0,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        scope: ScopeConfig {
            seeds: vec![format!("{}/", site_url)],
            domains: vec![],
            patterns: vec![format!("^{}/", regex::escape(site_url))],
        },
        chunking: ChunkingConfig {
            max_chunk_length: 1000,
            overlap_length: 100,
        },
        classifier: None,
        output: OutputConfig {
            directory: ".".to_string(),
            file_prefix: "crawled_chunks".to_string(),
        },
        sink: sink_endpoint.map(|endpoint| SinkConfig {
            endpoint,
            collection_name: "website_chunks".to_string(),
            request_timeout: 5_000,
            delivery_delay: 0,
            queue_capacity: 4,
        }),
    }
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn start_sink(status: u16) -> MockServer {
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add_embedding"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&sink)
        .await;
    sink
}

async fn sink_records(sink: &MockServer) -> Vec<Value> {
    sink.received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).expect("sink body is JSON"))
        .collect()
}

#[tokio::test]
async fn test_full_crawl_delivers_chunks() {
    let site = MockServer::start().await;
    let base_url = site.uri();
    let sink = start_sink(200).await;

    mount_page(
        &site,
        "/",
        r#"<html><head><title>Home</title><script>var x = 1;</script></head><body>
            <h1>Welcome</h1>
            <p> Home content </p>
            <a href="/page1">Page 1</a>
            <a href="page2">Page 2</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &site,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body><p>Content 1</p></body></html>"#,
    )
    .await;
    mount_page(
        &site,
        "/page2",
        r#"<html><body><style>p { color: red }</style><p>Content 2</p></body></html>"#,
    )
    .await;

    let config = create_test_config(&base_url, 2, Some(format!("{}/add_embedding", sink.uri())));
    let coordinator = Coordinator::from_config(&config, true).expect("Failed to create coordinator");
    let outcome = coordinator
        .run(CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.phase, CrawlPhase::Done);
    assert!(!outcome.is_partial());
    assert_eq!(outcome.report.urls_visited, 3);
    assert_eq!(outcome.report.pages_processed(), 3);
    assert_eq!(outcome.chunks.len(), 3);

    let home = &outcome.chunks[0];
    assert_eq!(home.source_url, format!("{}/", base_url));
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.content, "Welcome Home content Page 1 Page 2");
    assert_eq!(home.position, 0);

    let contents: Vec<&str> = outcome.chunks.iter().map(|c| c.content.as_str()).collect();
    assert!(contents.contains(&"Content 1"));
    assert!(contents.contains(&"Content 2"));

    // One POST per chunk, in position order
    let records = sink_records(&sink).await;
    assert_eq!(records.len(), 3);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record["position"], i as u64);
        assert_eq!(record["collection_name"], "website_chunks");
        assert_eq!(record["content"], outcome.chunks[i].content.as_str());
        assert_eq!(record["url"], outcome.chunks[i].source_url.as_str());
    }
    assert_eq!(records[0]["title"], "Home");

    let delivery = outcome.report.delivery.expect("sink configured");
    assert_eq!(delivery.attempted, 3);
    assert_eq!(delivery.succeeded, 3);
    assert_eq!(delivery.failed, 0);
    assert!(!outcome.report.has_failures());

    // Result file mirrors the committed chunks
    let dir = tempfile::tempdir().unwrap();
    let file = write_results(dir.path(), "crawled_chunks", &outcome.chunks).unwrap();
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(file).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 3);
    assert_eq!(saved[0]["url"], home.source_url.as_str());
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_page(&site, "/", r#"<body>Level 0 <a href="/level1">next</a></body>"#).await;
    mount_page(&site, "/level1", r#"<body>Level 1 <a href="/level2">next</a></body>"#).await;

    // Beyond max_depth: must never be requested
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html("<body>Level 2</body>"))
        .expect(0)
        .mount(&site)
        .await;

    let config = create_test_config(&base_url, 1, None);
    let outcome = Coordinator::from_config(&config, false)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.report.urls_visited, 2);
    assert_eq!(outcome.report.links_too_deep, 1);
    assert!(outcome.report.delivery.is_none());
}

#[tokio::test]
async fn test_out_of_scope_links_not_fetched() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<body>Elsewhere</body>"))
        .expect(0)
        .mount(&elsewhere)
        .await;

    mount_page(
        &site,
        "/",
        format!(
            r#"<body>Home <a href="{}/page">out</a> <a href="mailto:a@b.c">mail</a></body>"#,
            elsewhere.uri()
        ),
    )
    .await;

    let config = create_test_config(&site.uri(), 3, None);
    let outcome = Coordinator::from_config(&config, false)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.report.urls_visited, 1);
    assert_eq!(outcome.report.links_out_of_scope, 1);
}

#[tokio::test]
async fn test_same_page_fetched_once() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        r#"<body>
            <a href="/a">a</a>
            <a href="/a/">a slash</a>
            <a href="/a#section">a fragment</a>
            <a href="/a?utm_source=newsletter">a tracked</a>
            <a href="/b">b</a>
        </body>"#,
    )
    .await;
    mount_page(&site, "/b", r#"<body>B <a href="/a">a again</a> <a href="/">home</a></body>"#).await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<body>A <a href="/b">b</a></body>"#))
        .expect(1)
        .mount(&site)
        .await;

    let config = create_test_config(&site.uri(), 3, None);
    let outcome = Coordinator::from_config(&config, false)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.report.urls_visited, 3);
    assert_eq!(outcome.report.pages_processed(), 3);
}

#[tokio::test]
async fn test_fetch_failures_do_not_abort_run() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        r#"<body>Home
            <a href="/missing">404</a>
            <a href="/broken">500</a>
            <a href="/report.pdf">pdf</a>
            <a href="/ok">ok</a>
        </body>"#,
    )
    .await;
    // /missing is unmatched, so wiremock answers 404
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .mount(&site)
        .await;
    mount_page(&site, "/ok", "<body>Still crawled</body>").await;

    let config = create_test_config(&site.uri(), 1, None);
    let outcome = Coordinator::from_config(&config, false)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.phase, CrawlPhase::Done);
    assert!(!outcome.is_partial());
    assert_eq!(outcome.report.pages_in(PageState::DeadLink), 1);
    assert_eq!(outcome.report.pages_in(PageState::Failed), 1);
    assert_eq!(outcome.report.pages_in(PageState::ContentMismatch), 1);
    assert_eq!(outcome.report.fetch_failures(), 3);
    assert_eq!(outcome.report.pages_processed(), 2);
    assert!(outcome.chunks.iter().any(|c| c.content == "Still crawled"));
    assert!(outcome.report.has_failures());
}

#[tokio::test]
async fn test_sink_failures_are_counted() {
    let site = MockServer::start().await;
    let sink = start_sink(503).await;

    mount_page(&site, "/", r#"<body>Home <a href="/next">next</a></body>"#).await;
    mount_page(&site, "/next", "<body>Next</body>").await;

    let config = create_test_config(&site.uri(), 1, Some(format!("{}/add_embedding", sink.uri())));
    let outcome = Coordinator::from_config(&config, true)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    // Every chunk is still attempted and still committed
    assert_eq!(outcome.chunks.len(), 2);
    assert_eq!(sink_records(&sink).await.len(), 2);

    let delivery = outcome.report.delivery.unwrap();
    assert_eq!(delivery.attempted, 2);
    assert_eq!(delivery.succeeded, 0);
    assert_eq!(delivery.failed, 2);
    assert!(outcome.report.has_failures());
    assert!(!outcome.is_partial());
}

#[tokio::test]
async fn test_redirect_uses_final_url() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/landing"))
        .mount(&site)
        .await;
    mount_page(
        &site,
        "/landing",
        r#"<body>Landing <a href="/landing">self</a></body>"#,
    )
    .await;

    let config = create_test_config(&base_url, 2, None);
    let outcome = Coordinator::from_config(&config, false)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.chunks.len(), 1);
    assert_eq!(outcome.chunks[0].source_url, format!("{}/landing", base_url));
    // One request for the redirect, one for the landing page; the self-link
    // is recognised as the page just crawled
    assert_eq!(outcome.report.urls_visited, 2);
    assert_eq!(outcome.report.pages_redirected(), 1);
    assert_eq!(outcome.report.pages_processed(), 1);
}

#[tokio::test]
async fn test_redirect_to_crawled_page_is_not_refetched() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount_page(
        &site,
        "/",
        r#"<body>Home <a href="/b">b</a> <a href="/old">old</a></body>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/b"))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<body>Page B</body>"))
        .expect(1)
        .mount(&site)
        .await;

    let config = create_test_config(&base_url, 2, None);
    let outcome = Coordinator::from_config(&config, false)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    let b_url = format!("{}/b", base_url);
    assert_eq!(
        outcome.chunks.iter().filter(|c| c.source_url == b_url).count(),
        1
    );
    assert_eq!(outcome.report.pages_redirected(), 1);
    assert!(outcome.report.links_already_visited >= 1);
}

#[tokio::test]
async fn test_redirect_out_of_scope_is_not_followed() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<body>foreign text</body>"))
        .expect(0)
        .mount(&elsewhere)
        .await;

    let foreign = format!("{}/x", elsewhere.uri());
    mount_page(&site, "/", r#"<body>Home <a href="/go">go</a></body>"#).await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", foreign.as_str()))
        .mount(&site)
        .await;

    let config = create_test_config(&site.uri(), 2, None);
    let outcome = Coordinator::from_config(&config, false)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.chunks.len(), 1);
    assert!(outcome.chunks.iter().all(|c| !c.content.contains("foreign")));
    assert_eq!(outcome.report.links_out_of_scope, 1);
    assert_eq!(outcome.report.pages_redirected(), 1);
    assert!(!outcome.report.has_failures());
}

#[tokio::test]
async fn test_cancellation_yields_partial_results() {
    let site = MockServer::start().await;
    let sink = start_sink(200).await;

    mount_page(&site, "/", r#"<body>Home <a href="/slow">slow</a></body>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<body>Too late</body>").set_delay(Duration::from_secs(30)))
        .mount(&site)
        .await;

    let config = create_test_config(&site.uri(), 2, Some(format!("{}/add_embedding", sink.uri())));
    let coordinator = Coordinator::from_config(&config, true).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(10), coordinator.run(cancel))
        .await
        .expect("cancellation did not stop the crawl")
        .unwrap();

    assert_eq!(outcome.phase, CrawlPhase::Done);
    assert!(outcome.is_partial());
    assert_eq!(outcome.report.pages_abandoned(), 1);
    assert_eq!(outcome.chunks.len(), 1);
    assert_eq!(outcome.chunks[0].content, "Home slow");
    // Only the chunk committed before cancellation can have reached the sink
    assert!(sink_records(&sink).await.len() <= 1);
}
