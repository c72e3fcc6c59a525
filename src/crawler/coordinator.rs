//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Owning the frontier for one run
//! - Driving each page through fetch → extract → render → upload
//! - Isolating per-page failures
//! - Producing the run report
//!
//! # Traversal Order
//!
//! Pending URLs live on an explicit LIFO stack. Links discovered on a page are
//! pushed in reverse, so with one page in flight the pop order is the
//! depth-first pre-order: a page's first link and everything under it is
//! finished before its second link. URLs are claimed in the frontier when
//! popped, which makes a URL reachable from several pages run at most once.

use crate::config::{default_payload_field, Config};
use crate::crawler::{build_http_client, FetchedPage, Frontier, HttpFetcher, PageFetcher};
use crate::extract::{ExtractContext, Extractable};
use crate::output::CrawlReport;
use crate::render::{DocumentRenderer, PdfRenderer};
use crate::sink::{build_sink, BlobSink};
use crate::state::PageState;
use crate::url::{NormalizedUrl, Scope};
use crate::FolioError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinSet};

/// Everything one page needs on its way through the pipeline
struct PagePipeline {
    scope: Scope,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn DocumentRenderer>,
    sink: Arc<dyn BlobSink>,
    payload_field: String,
}

/// How one claimed URL ended
enum PageOutcome {
    Visited {
        document: String,
        links: Vec<NormalizedUrl>,
    },
    Failed {
        url: NormalizedUrl,
        reason: String,
    },
}

impl PagePipeline {
    fn advance(&self, url: &NormalizedUrl, to: PageState) -> Result<(), FolioError> {
        self.frontier.transition(url, to)
    }

    async fn process(
        &self,
        url: &NormalizedUrl,
    ) -> Result<(String, Vec<NormalizedUrl>), FolioError> {
        self.advance(url, PageState::Fetching)?;
        let page: FetchedPage = self.fetcher.fetch(url).await?;

        self.advance(url, PageState::Extracting)?;
        let extraction = {
            let ctx = ExtractContext {
                scope: &self.scope,
                frontier: &self.frontier,
                payload_field: &self.payload_field,
            };
            page.extract(&ctx)
        };

        self.advance(url, PageState::Rendering)?;
        let document = self.renderer.render(&extraction.record)?;

        self.advance(url, PageState::Uploading)?;
        self.sink.store(&document.name, &document.bytes).await?;

        self.advance(url, PageState::Visited)?;
        tracing::info!(
            "Stored {} ({} pages, {} bytes) for {}",
            document.name,
            document.page_count,
            document.bytes.len(),
            url
        );

        Ok((document.name, extraction.links))
    }

    async fn run_page(self: Arc<Self>, url: NormalizedUrl) -> PageOutcome {
        match self.process(&url).await {
            Ok((document, links)) => {
                tracing::debug!("{} links to follow from {}", links.len(), url);
                PageOutcome::Visited { document, links }
            }
            Err(e) => {
                tracing::error!("Error processing {}: {}", url, e);
                if let Err(transition) = self.frontier.transition(&url, PageState::Failed) {
                    tracing::warn!("Could not mark {} as failed: {}", url, transition);
                }
                PageOutcome::Failed {
                    url,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Main crawler coordinator structure
///
/// One coordinator owns the state of one crawl run. Nothing is shared
/// between coordinators, so concurrent runs cannot see each other's frontier.
pub struct Coordinator {
    scope: Scope,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn DocumentRenderer>,
    sink: Arc<dyn BlobSink>,
    payload_field: String,
    max_concurrent_pages: usize,
    max_pages: Option<u64>,
}

impl Coordinator {
    /// Creates a coordinator with the HTTP fetcher, PDF renderer and the
    /// configured sink
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(FolioError)` - Failed to initialize
    pub fn new(config: &Config) -> Result<Self, FolioError> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;
        let sink = build_sink(&config.sink, client.clone())?;

        let coordinator = Self::with_parts(
            Scope::new(&config.crawler.base_url)?,
            Arc::new(HttpFetcher::new(client)),
            Arc::new(PdfRenderer::new()),
            sink,
        )
        .with_payload_field(&config.crawler.payload_field)
        .with_max_concurrent_pages(config.crawler.max_concurrent_pages as usize)
        .with_max_pages(config.crawler.max_pages.map(u64::from));

        Ok(coordinator)
    }

    /// Creates a coordinator from explicit collaborators
    pub fn with_parts(
        scope: Scope,
        fetcher: Arc<dyn PageFetcher>,
        renderer: Arc<dyn DocumentRenderer>,
        sink: Arc<dyn BlobSink>,
    ) -> Self {
        Self {
            scope,
            frontier: Arc::new(Frontier::new()),
            fetcher,
            renderer,
            sink,
            payload_field: default_payload_field(),
            max_concurrent_pages: 1,
            max_pages: None,
        }
    }

    pub fn with_payload_field(mut self, field: &str) -> Self {
        self.payload_field = field.to_string();
        self
    }

    pub fn with_max_concurrent_pages(mut self, max: usize) -> Self {
        self.max_concurrent_pages = max.max(1);
        self
    }

    pub fn with_max_pages(mut self, max: Option<u64>) -> Self {
        self.max_pages = max;
        self
    }

    /// The frontier of this run
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    fn pipeline(&self) -> Arc<PagePipeline> {
        Arc::new(PagePipeline {
            scope: self.scope.clone(),
            frontier: Arc::clone(&self.frontier),
            fetcher: Arc::clone(&self.fetcher),
            renderer: Arc::clone(&self.renderer),
            sink: Arc::clone(&self.sink),
            payload_field: self.payload_field.clone(),
        })
    }

    /// Runs the crawl until no reachable in-scope URL remains
    ///
    /// Page failures are logged and counted; they never end the run.
    pub async fn run(&self) -> CrawlReport {
        let pipeline = self.pipeline();
        let seed = self.scope.seed();
        let mut report = CrawlReport::start(seed.as_str());
        tracing::info!("Starting crawl of {} via {}", seed, self.sink.describe());

        let mut stack = vec![seed];
        let mut in_flight: JoinSet<PageOutcome> = JoinSet::new();
        let mut task_urls: HashMap<Id, NormalizedUrl> = HashMap::new();
        let mut claimed: u64 = 0;

        loop {
            while in_flight.len() < self.max_concurrent_pages {
                let Some(url) = stack.pop() else {
                    break;
                };

                if self.max_pages.is_some_and(|max| claimed >= max) {
                    let dropped = 1 + stack.len() as u64;
                    tracing::warn!("Page limit reached, dropping {} pending URLs", dropped);
                    report.record_skipped(dropped);
                    stack.clear();
                    break;
                }

                if !self.frontier.check_and_mark(&url) {
                    tracing::debug!("Skipping already visited URL: {}", url);
                    report.record_skipped(1);
                    continue;
                }

                claimed += 1;
                let task = in_flight.spawn(Arc::clone(&pipeline).run_page(url.clone()));
                task_urls.insert(task.id(), url);
            }

            let Some(joined) = in_flight.join_next_with_id().await else {
                break;
            };

            match joined {
                Ok((id, outcome)) => {
                    task_urls.remove(&id);
                    match outcome {
                        PageOutcome::Visited { document, links } => {
                            report.record_visited(document);
                            stack.extend(links.into_iter().rev());
                        }
                        PageOutcome::Failed { url, reason } => {
                            report.record_failed(url.as_str(), reason);
                        }
                    }
                }
                Err(e) => match task_urls.remove(&e.id()) {
                    Some(url) => {
                        tracing::error!("Page task for {} aborted: {}", url, e);
                        if let Err(transition) = self.frontier.transition(&url, PageState::Failed)
                        {
                            tracing::warn!("Could not mark {} as failed: {}", url, transition);
                        }
                        report.record_failed(url.as_str(), e.to_string());
                    }
                    None => {
                        tracing::error!("Untracked page task aborted: {}", e);
                        report.record_failed("<unknown>", e.to_string());
                    }
                },
            }

            let done = report.total_processed();
            if done % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages processed, {} pending",
                    done,
                    stack.len()
                );
            }
        }

        report.finish(self.frontier.snapshot_counts());
        tracing::info!(
            "Crawl completed: {} visited, {} failed, {} skipped",
            report.visited,
            report.failed,
            report.skipped
        );

        report
    }
}

/// Runs one crawl with the configured collaborators
///
/// # Example
///
/// ```no_run
/// use folio_crawl::config::load_config;
/// use folio_crawl::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("folio.toml"))?;
/// let report = run_crawl(&config).await?;
/// println!("{} documents stored", report.visited);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlReport, FolioError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionRecord;
    use crate::render::RenderedDocument;
    use crate::sink::MemorySink;
    use crate::url::normalize;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://site.test/a";

    /// Serves canned markup and records every request
    struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &NormalizedUrl) -> Result<FetchedPage, FolioError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some(body) => Ok(FetchedPage::Html {
                    url: url.clone(),
                    body: body.clone(),
                }),
                None => Err(FolioError::FetchFailed {
                    url: url.to_string(),
                    cause: "HTTP 404".to_string(),
                }),
            }
        }
    }

    /// Fails for one URL, renders a tiny placeholder otherwise
    struct FlakyRenderer {
        fail_on: String,
    }

    impl DocumentRenderer for FlakyRenderer {
        fn render(&self, record: &ExtractionRecord) -> Result<RenderedDocument, FolioError> {
            if record.source_url.as_str() == self.fail_on {
                return Err(FolioError::RenderFailed {
                    url: record.source_url.to_string(),
                    cause: "boom".to_string(),
                });
            }
            Ok(RenderedDocument {
                name: crate::url::storage_name(&record.source_url),
                bytes: record.paragraphs.join("\n").into_bytes(),
                page_count: 1,
            })
        }
    }

    /// Panics while rendering one URL
    struct PanickingRenderer {
        panic_on: String,
    }

    impl DocumentRenderer for PanickingRenderer {
        fn render(&self, record: &ExtractionRecord) -> Result<RenderedDocument, FolioError> {
            if record.source_url.as_str() == self.panic_on {
                panic!("renderer crashed on {}", record.source_url);
            }
            PdfRenderer::new().render(record)
        }
    }

    /// Refuses one blob name, stores everything else in memory
    struct RejectingSink {
        inner: MemorySink,
        reject: String,
    }

    #[async_trait]
    impl BlobSink for RejectingSink {
        async fn store(&self, name: &str, bytes: &[u8]) -> Result<(), FolioError> {
            if name == self.reject {
                return Err(FolioError::UploadFailed {
                    name: name.to_string(),
                    cause: "HTTP 503".to_string(),
                });
            }
            self.inner.store(name, bytes).await
        }

        fn describe(&self) -> String {
            "rejecting".to_string()
        }
    }

    fn coordinator(fetcher: Arc<StaticFetcher>, sink: Arc<MemorySink>) -> Coordinator {
        Coordinator::with_parts(
            Scope::new(BASE).unwrap(),
            fetcher,
            Arc::new(PdfRenderer::new()),
            sink,
        )
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        // a -> [x, y]; x -> [x1]; y -> []
        let fetcher = Arc::new(StaticFetcher::new(&[
            (BASE, r#"<a href="/a/x">x</a><a href="/a/y">y</a>"#),
            ("https://site.test/a/x", r#"<a href="/a/x1">x1</a>"#),
            ("https://site.test/a/x1", r#"<a href="/a/y">back to y</a>"#),
            ("https://site.test/a/y", "<p>leaf</p>"),
        ]));
        let sink = Arc::new(MemorySink::new());

        let report = coordinator(fetcher.clone(), sink.clone()).run().await;

        assert_eq!(
            fetcher.requests(),
            vec![
                "https://site.test/a",
                "https://site.test/a/x",
                "https://site.test/a/x1",
                "https://site.test/a/y",
            ]
        );
        assert_eq!(report.visited, 4);
        assert_eq!(report.failed, 0);
        // y was pushed twice, the second pop is skipped
        assert_eq!(report.skipped, 1);
        assert_eq!(sink.len(), 4);
    }

    #[tokio::test]
    async fn test_each_url_processed_once() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            (BASE, r#"<a href="/a/p">p</a><a href="/a/q">q</a>"#),
            ("https://site.test/a/p", r#"<a href="/a">home</a><a href="/a/q#x">q</a>"#),
            ("https://site.test/a/q", r#"<a href="/a/p">p</a><a href="/a">home</a>"#),
        ]));
        let sink = Arc::new(MemorySink::new());

        let coordinator = coordinator(fetcher.clone(), sink.clone());
        let report = coordinator.run().await;

        let mut requests = fetcher.requests();
        requests.sort();
        requests.dedup();
        assert_eq!(requests.len(), fetcher.requests().len());
        assert_eq!(report.visited, 3);
        assert_eq!(sink.write_count(), 3);
        assert_eq!(coordinator.frontier().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_stop_siblings() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            (BASE, r#"<a href="/a/missing">gone</a><a href="/a/ok">ok</a>"#),
            ("https://site.test/a/ok", "<p>fine</p>"),
        ]));
        let sink = Arc::new(MemorySink::new());

        let coordinator = coordinator(fetcher, sink.clone());
        let report = coordinator.run().await;

        assert_eq!(report.visited, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].url, "https://site.test/a/missing");
        assert!(report.failures[0].reason.contains("404"));
        assert_eq!(
            coordinator
                .frontier()
                .state(&normalize("/a/missing", BASE)),
            Some(PageState::Failed)
        );
        assert!(sink.get("https___site.test_a_ok.pdf").is_some());
    }

    #[tokio::test]
    async fn test_render_failure_is_isolated() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            (BASE, r#"<a href="/a/bad">bad</a><a href="/a/good">good</a>"#),
            ("https://site.test/a/bad", r#"<a href="/a/only-from-bad">x</a>"#),
            ("https://site.test/a/good", "<p>good</p>"),
            ("https://site.test/a/only-from-bad", "<p>unreached</p>"),
        ]));
        let sink = Arc::new(MemorySink::new());

        let coordinator = Coordinator::with_parts(
            Scope::new(BASE).unwrap(),
            fetcher.clone(),
            Arc::new(FlakyRenderer {
                fail_on: "https://site.test/a/bad".to_string(),
            }),
            sink.clone(),
        );
        let report = coordinator.run().await;

        assert_eq!(report.visited, 2);
        assert_eq!(report.failed, 1);
        assert!(sink.get("https___site.test_a_bad.pdf").is_none());
        assert!(!fetcher
            .requests()
            .contains(&"https://site.test/a/only-from-bad".to_string()));
    }

    #[tokio::test]
    async fn test_panicking_page_is_marked_failed() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            (BASE, r#"<a href="/a/bad">bad</a><a href="/a/good">good</a>"#),
            ("https://site.test/a/bad", "<p>bad</p>"),
            ("https://site.test/a/good", "<p>good</p>"),
        ]));
        let sink = Arc::new(MemorySink::new());

        let coordinator = Coordinator::with_parts(
            Scope::new(BASE).unwrap(),
            fetcher,
            Arc::new(PanickingRenderer {
                panic_on: "https://site.test/a/bad".to_string(),
            }),
            sink.clone(),
        );
        let report = coordinator.run().await;

        assert_eq!(report.visited, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].url, "https://site.test/a/bad");
        assert!(report.failures[0].reason.contains("panicked"));
        assert_eq!(
            coordinator.frontier().state(&normalize("/a/bad", BASE)),
            Some(PageState::Failed)
        );
        assert_eq!(report.pages_by_state.get(&PageState::Failed), Some(&1));
        assert_eq!(report.pages_by_state.get(&PageState::Visited), Some(&2));
        assert_eq!(report.pages_by_state.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_failure_is_isolated() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            (BASE, r#"<a href="/a/bad">bad</a><a href="/a/good">good</a>"#),
            ("https://site.test/a/bad", "<p>bad</p>"),
            ("https://site.test/a/good", "<p>good</p>"),
        ]));
        let sink = Arc::new(RejectingSink {
            inner: MemorySink::new(),
            reject: "https___site.test_a_bad.pdf".to_string(),
        });

        let coordinator = Coordinator::with_parts(
            Scope::new(BASE).unwrap(),
            fetcher,
            Arc::new(PdfRenderer::new()),
            sink.clone(),
        );
        let report = coordinator.run().await;

        assert_eq!(report.visited, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].url, "https://site.test/a/bad");
        assert!(report.failures[0]
            .reason
            .contains("Upload failed for https___site.test_a_bad.pdf"));
        assert_eq!(
            coordinator.frontier().state(&normalize("/a/bad", BASE)),
            Some(PageState::Failed)
        );
        assert!(sink.inner.get("https___site.test_a_good.pdf").is_some());
        assert!(sink.inner.get("https___site.test_a_bad.pdf").is_none());
    }

    #[tokio::test]
    async fn test_seed_failure_ends_run_cleanly() {
        let fetcher = Arc::new(StaticFetcher::new(&[]));
        let sink = Arc::new(MemorySink::new());

        let report = coordinator(fetcher, sink.clone()).run().await;

        assert_eq!(report.visited, 0);
        assert_eq!(report.failed, 1);
        assert!(report.finished_at.is_some());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_max_pages_caps_run() {
        let fetcher = Arc::new(StaticFetcher::new(&[
            (BASE, r#"<a href="/a/1">1</a><a href="/a/2">2</a><a href="/a/3">3</a>"#),
            ("https://site.test/a/1", "<p>1</p>"),
            ("https://site.test/a/2", "<p>2</p>"),
            ("https://site.test/a/3", "<p>3</p>"),
        ]));
        let sink = Arc::new(MemorySink::new());

        let report = coordinator(fetcher, sink.clone())
            .with_max_pages(Some(2))
            .run()
            .await;

        assert_eq!(report.visited, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_workers_visit_everything_once() {
        let mut pages = vec![(BASE.to_string(), String::new())];
        let mut index_links = String::new();
        for i in 0..20 {
            index_links.push_str(&format!(r#"<a href="/a/{}">{}</a>"#, i, i));
            pages.push((
                format!("https://site.test/a/{}", i),
                format!(r#"<p>{}</p><a href="/a/{}">next</a>"#, i, (i + 1) % 20),
            ));
        }
        pages[0].1 = index_links;
        let borrowed: Vec<(&str, &str)> = pages
            .iter()
            .map(|(u, b)| (u.as_str(), b.as_str()))
            .collect();

        let fetcher = Arc::new(StaticFetcher::new(&borrowed));
        let sink = Arc::new(MemorySink::new());

        let report = coordinator(fetcher.clone(), sink.clone())
            .with_max_concurrent_pages(4)
            .run()
            .await;

        assert_eq!(report.visited, 21);
        assert_eq!(report.failed, 0);
        assert_eq!(fetcher.requests().len(), 21);
        assert_eq!(sink.write_count(), 21);
    }
}
