//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use folio_crawl::config::{Config, CrawlerConfig, SinkConfig, UserAgentConfig};
use folio_crawl::crawler::{build_http_client, run_crawl, Coordinator, HttpFetcher};
use folio_crawl::extract::ExtractionRecord;
use folio_crawl::render::{DocumentRenderer, PdfRenderer};
use folio_crawl::sink::MemorySink;
use folio_crawl::state::PageState;
use folio_crawl::url::{normalize, storage_name, Scope};
use folio_crawl::{FolioError, RenderedDocument};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders through `PdfRenderer` and keeps every record it saw
#[derive(Default)]
struct RecordingRenderer {
    inner: PdfRenderer,
    records: Mutex<Vec<ExtractionRecord>>,
}

impl RecordingRenderer {
    fn record_for(&self, url: &str) -> Option<ExtractionRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.source_url.as_str() == url)
            .cloned()
    }
}

impl DocumentRenderer for RecordingRenderer {
    fn render(&self, record: &ExtractionRecord) -> Result<RenderedDocument, FolioError> {
        self.records.lock().unwrap().push(record.clone());
        self.inner.render(record)
    }
}

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: None,
    }
}

/// Creates a test configuration rooted at `base_url`
fn create_test_config(base_url: &str, sink: SinkConfig) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            max_concurrent_pages: 2,
            max_pages: None,
            request_timeout_secs: 5,
            payload_field: "products".to_string(),
        },
        user_agent: user_agent(),
        sink,
    }
}

fn coordinator_with(
    base_url: &str,
    renderer: Arc<RecordingRenderer>,
    sink: Arc<MemorySink>,
) -> Coordinator {
    let client = build_http_client(&user_agent(), Duration::from_secs(5)).unwrap();
    Coordinator::with_parts(
        Scope::new(base_url).unwrap(),
        Arc::new(HttpFetcher::new(client)),
        renderer,
        sink,
    )
}

async fn mount_html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_two_documents() {
    let server = MockServer::start().await;
    let base_url = format!("{}/site", server.uri());

    mount_html(
        &server,
        "/site",
        r#"<html><body>
        <h1>Welcome</h1>
        <p>Hello</p>
        <p>Hello </p>
        <a href="https://other.test/x">elsewhere</a>
        <a href="/outside">outside</a>
        <a href="/site/sub">sub</a>
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/site/sub", "<p>Sub page</p>").await;

    // Out of scope on the same host: must never be requested
    Mock::given(method("GET"))
        .and(path("/outside"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let renderer = Arc::new(RecordingRenderer::default());
    let sink = Arc::new(MemorySink::new());
    let coordinator = coordinator_with(&base_url, renderer.clone(), sink.clone());

    let report = coordinator.run().await;

    assert_eq!(report.visited, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(sink.len(), 2);

    let seed = normalize(&base_url, &base_url);
    let sub = normalize("/site/sub", &base_url);
    assert!(sink.get(&storage_name(&seed)).is_some());
    assert!(sink.get(&storage_name(&sub)).is_some());

    let seed_record = renderer.record_for(seed.as_str()).unwrap();
    assert_eq!(seed_record.paragraphs, vec!["Hello".to_string()]);
    assert_eq!(seed_record.headers, vec!["Welcome".to_string()]);

    for name in sink.names() {
        assert!(sink.get(&name).unwrap().starts_with(b"%PDF"));
    }
}

#[tokio::test]
async fn test_fragment_variants_fetched_once() {
    let server = MockServer::start().await;
    let base_url = format!("{}/site", server.uri());

    mount_html(
        &server,
        "/site",
        r##"<a href="/site/sub#top">a</a><a href="/site/sub#bottom">b</a><a href="#self">c</a>"##,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/site/sub"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>once</p>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let renderer = Arc::new(RecordingRenderer::default());
    let sink = Arc::new(MemorySink::new());
    let coordinator = coordinator_with(&base_url, renderer, sink.clone());

    let report = coordinator.run().await;

    assert_eq!(report.visited, 2);
    assert_eq!(sink.write_count(), 2);
    assert_eq!(coordinator.frontier().len(), 2);
}

#[tokio::test]
async fn test_json_page_payload() {
    let server = MockServer::start().await;
    let base_url = format!("{}/site", server.uri());

    mount_html(&server, "/site", r#"<a href="/site/products">products</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/site/products"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"products":[{"id":1,"name":"Lamp"},{"id":2,"name":"Desk"}],"links":["/site/hidden"]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let renderer = Arc::new(RecordingRenderer::default());
    let sink = Arc::new(MemorySink::new());
    let coordinator = coordinator_with(&base_url, renderer.clone(), sink.clone());

    let report = coordinator.run().await;

    // JSON documents contribute no links
    assert_eq!(report.visited, 2);

    let products_url = normalize("/site/products", &base_url);
    let record = renderer.record_for(products_url.as_str()).unwrap();
    assert_eq!(record.structured_payload.len(), 2);
    assert_eq!(record.structured_payload[1]["name"], "Desk");
    assert!(record.paragraphs.is_empty());
    assert!(sink.get(&storage_name(&products_url)).is_some());
}

#[tokio::test]
async fn test_page_failure_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let base_url = format!("{}/site", server.uri());

    mount_html(
        &server,
        "/site",
        r#"<a href="/site/broken">broken</a><a href="/site/ok">ok</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/site/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(&server, "/site/ok", "<p>fine</p>").await;

    let renderer = Arc::new(RecordingRenderer::default());
    let sink = Arc::new(MemorySink::new());
    let coordinator = coordinator_with(&base_url, renderer, sink.clone());

    let report = coordinator.run().await;

    assert_eq!(report.visited, 2);
    assert_eq!(report.failed, 1);
    assert!(report.failures[0].url.ends_with("/site/broken"));
    assert!(report.failures[0].reason.contains("500"));
    assert_eq!(sink.len(), 2);

    let broken = normalize("/site/broken", &base_url);
    assert_eq!(
        coordinator.frontier().state(&broken),
        Some(PageState::Failed)
    );
}

#[tokio::test]
async fn test_full_run_with_filesystem_sink() {
    let server = MockServer::start().await;
    let base_url = format!("{}/docs", server.uri());
    let out = tempfile::tempdir().unwrap();

    mount_html(
        &server,
        "/docs",
        r#"<h2>Index</h2><a href="/docs/one">one</a><a href="/docs/two">two</a>"#,
    )
    .await;
    mount_html(&server, "/docs/one", "<div>first</div>").await;
    mount_html(&server, "/docs/two", "<span>second</span>").await;

    let config = create_test_config(
        &base_url,
        SinkConfig::Filesystem {
            directory: out.path().to_string_lossy().to_string(),
        },
    );

    let report = run_crawl(&config).await.unwrap();
    assert_eq!(report.visited, 3);
    assert_eq!(report.documents.len(), 3);

    for document in &report.documents {
        let bytes = std::fs::read(out.path().join(document)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

#[tokio::test]
async fn test_unreachable_seed_reports_failure() {
    let server = MockServer::start().await;
    let base_url = format!("{}/missing", server.uri());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(&base_url, SinkConfig::Memory);
    let report = run_crawl(&config).await.unwrap();

    assert_eq!(report.visited, 0);
    assert_eq!(report.failed, 1);
    assert!(report.documents.is_empty());
}
