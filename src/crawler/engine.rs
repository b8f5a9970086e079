//! Traversal engine
//!
//! The crawl loop: pop a task, render its page, classify each outbound
//! link, and either download it, enqueue it one level deeper, or drop
//! it. Traversal is an explicit FIFO worklist of `(url, depth)` tasks
//! rather than recursion, so depth is data and the call stack stays
//! flat. Individual page-load and download failures are logged and
//! yield nothing further; they never abort the run.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::time::sleep;
use url::Url;

use crate::config::CrawlLimits;
use crate::crawler::classifier::{classify, ResourceKind};
use crate::crawler::frontier::Frontier;
use crate::fetch::{PageFetcher, ResourceFetcher};
use crate::storage::{derive_filename, BlobMirror, LocalStore};
use crate::url::{host_of, matches_any};
use crate::Result;

/// One pending visit: a URL and its link-hop depth (start URL = 1)
#[derive(Debug, Clone)]
pub struct Task {
    pub url: Url,
    pub depth: u32,
}

/// Outcome of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Files downloaded successfully
    pub downloaded: usize,
    /// Distinct URLs visited
    pub visited: usize,
}

/// The crawl loop over its collaborators
pub struct Engine<R: ResourceFetcher> {
    limits: CrawlLimits,
    frontier: Arc<Frontier>,
    pages: Box<dyn PageFetcher>,
    resources: R,
    store: LocalStore,
    mirror: Option<BlobMirror>,
}

impl<R: ResourceFetcher> Engine<R> {
    pub fn new(
        limits: CrawlLimits,
        frontier: Arc<Frontier>,
        pages: Box<dyn PageFetcher>,
        resources: R,
        store: LocalStore,
        mirror: Option<BlobMirror>,
    ) -> Self {
        Self {
            limits,
            frontier,
            pages,
            resources,
            store,
            mirror,
        }
    }

    /// Runs the crawl from the starting URL until the worklist is empty
    /// or the download budget is exhausted.
    pub async fn run(&mut self, start: Url) -> Result<CrawlSummary> {
        let start_host = host_of(&start)?;

        let mut queue = VecDeque::new();
        queue.push_back(Task {
            url: start,
            depth: 1,
        });

        while let Some(task) = queue.pop_front() {
            if self.frontier.budget_exhausted() {
                tracing::info!("Download budget exhausted, halting traversal");
                break;
            }
            self.visit(&task, &start_host, &mut queue).await;
        }

        if let Err(e) = self.pages.close().await {
            tracing::warn!("Error closing page session: {}", e);
        }

        Ok(CrawlSummary {
            downloaded: self.frontier.downloads(),
            visited: self.frontier.visited_count(),
        })
    }

    /// Processes one task: load the page, classify every candidate link,
    /// dispatch downloads and enqueue recursions.
    async fn visit(&mut self, task: &Task, start_host: &str, queue: &mut VecDeque<Task>) {
        let url_str = task.url.as_str();

        if !self.frontier.try_visit(url_str) {
            return;
        }

        if matches_any(url_str, &self.limits.exclude_crawl) {
            tracing::info!("Skipping crawl (URL excluded): {}", url_str);
            return;
        }

        tracing::info!("Crawling (depth {}): {}", task.depth, url_str);
        if let Err(e) = self.pages.load(&task.url).await {
            tracing::warn!("Error loading {}: {}", url_str, e);
            return;
        }

        // Settle pause: rate limiting, and rendering time for the
        // browser-backed fetcher
        sleep(self.limits.delay).await;

        let links = match self.pages.outbound_links().await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Error extracting links from {}: {}", url_str, e);
                return;
            }
        };

        // Best-effort early filter; try_visit on the recursed task stays
        // authoritative
        let candidates: Vec<Url> = links
            .into_iter()
            .filter(|link| !self.frontier.is_visited(link.as_str()))
            .collect();
        tracing::debug!("Found {} candidate links on {}", candidates.len(), url_str);

        for link in candidates {
            match classify(&link, &self.limits, &self.resources).await {
                ResourceKind::File(ext) => {
                    self.try_download(&link, &ext).await;
                }
                ResourceKind::Page => {
                    if self.limits.stay_on_domain && !host_matches(&link, start_host) {
                        tracing::debug!("Skipping off-domain link: {}", link);
                        continue;
                    }

                    // Saving the page and recursing into it are gated
                    // independently
                    if self.limits.wants("html") {
                        self.try_download(&link, "html").await;
                    }

                    if self.limits.depth_reached(task.depth) {
                        tracing::debug!("Depth limit reached, not following {}", link);
                        continue;
                    }

                    queue.push_back(Task {
                        url: link,
                        depth: task.depth + 1,
                    });
                }
                ResourceKind::Unclassified => {
                    tracing::debug!("Dropping unclassified link: {}", link);
                }
            }
        }
    }

    /// Downloads one link, honoring exclusions, the already-present
    /// short-circuit, and the download budget.
    async fn try_download(&self, url: &Url, ext: &str) {
        let url_str = url.as_str();

        if matches_any(url_str, &self.limits.exclude_download) {
            tracing::info!("Skipping download (URL excluded): {}", url_str);
            return;
        }

        let name = derive_filename(url, ext);
        if self.store.exists(&name) {
            tracing::info!("File {} already exists, skipping it", name);
            return;
        }

        // Reserve the slot before fetching so the cap holds even under
        // concurrent dispatch
        if !self.frontier.record_download() {
            tracing::debug!("Download budget reached, skipping {}", url_str);
            return;
        }

        match self.fetch_and_store(url, &name).await {
            Ok(path) => {
                tracing::info!("Downloaded: {} -> {}", url_str, path.display());

                if let Some(mirror) = &self.mirror {
                    if let Err(e) = mirror.mirror(&path).await {
                        tracing::warn!("Mirror failed for {}: {}", path.display(), e);
                    }
                }

                sleep(self.limits.delay).await;
            }
            Err(e) => {
                tracing::warn!("Error downloading {}: {}", url_str, e);
                self.frontier.release_download();
            }
        }
    }

    async fn fetch_and_store(&self, url: &Url, name: &str) -> Result<PathBuf> {
        let body = self.resources.body(url).await?;
        self.store.save(name, body).await
    }
}

/// True when the link's host (host:port) equals the starting host.
/// Links whose host cannot be read are treated as off-domain.
fn host_matches(url: &Url, start_host: &str) -> bool {
    host_of(url).map(|h| h == start_host).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    use crate::fetch::BodyStream;
    use crate::SiteripError;

    /// Page fetcher stub serving a canned link graph
    struct StubPages {
        graph: HashMap<String, Vec<String>>,
        failing: HashSet<String>,
        loaded: Arc<Mutex<Vec<String>>>,
        current: Option<String>,
    }

    impl StubPages {
        fn new(graph: &[(&str, &[&str])]) -> (Self, Arc<Mutex<Vec<String>>>) {
            let loaded = Arc::new(Mutex::new(Vec::new()));
            let pages = Self {
                graph: graph
                    .iter()
                    .map(|(page, links)| {
                        (
                            page.to_string(),
                            links.iter().map(|l| l.to_string()).collect(),
                        )
                    })
                    .collect(),
                failing: HashSet::new(),
                loaded: Arc::clone(&loaded),
                current: None,
            };
            (pages, loaded)
        }

        fn with_failing(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for StubPages {
        async fn load(&mut self, url: &Url) -> Result<()> {
            self.loaded.lock().unwrap().push(url.to_string());
            if self.failing.contains(url.as_str()) {
                return Err(SiteripError::HttpStatus {
                    url: url.to_string(),
                    status: 500,
                });
            }
            self.current = Some(url.to_string());
            Ok(())
        }

        async fn outbound_links(&mut self) -> Result<HashSet<Url>> {
            let current = self.current.as_deref().unwrap_or("");
            Ok(self
                .graph
                .get(current)
                .map(|links| links.iter().map(|l| Url::parse(l).unwrap()).collect())
                .unwrap_or_default())
        }
    }

    /// Resource fetcher stub with canned content types and bodies
    struct StubResources {
        types: HashMap<String, String>,
        broken: HashSet<String>,
    }

    impl StubResources {
        fn new(types: &[(&str, &str)]) -> Self {
            Self {
                types: types
                    .iter()
                    .map(|(u, t)| (u.to_string(), t.to_string()))
                    .collect(),
                broken: HashSet::new(),
            }
        }

        fn with_broken_body(mut self, url: &str) -> Self {
            self.broken.insert(url.to_string());
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for StubResources {
        async fn content_type(&self, url: &Url) -> Result<String> {
            self.types.get(url.as_str()).cloned().ok_or_else(|| {
                SiteripError::ContentTypeUnavailable {
                    url: url.to_string(),
                }
            })
        }

        async fn body(&self, url: &Url) -> Result<BodyStream> {
            if self.broken.contains(url.as_str()) {
                return Err(SiteripError::HttpStatus {
                    url: url.to_string(),
                    status: 503,
                });
            }
            let chunks: Vec<Result<Bytes>> = vec![Ok(Bytes::from_static(b"content"))];
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    fn limits(max_depth: u32, max_files: usize, extensions: &[&str]) -> CrawlLimits {
        CrawlLimits {
            max_depth,
            max_files,
            stay_on_domain: true,
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            delay: Duration::from_millis(0),
            exclude_download: vec![],
            exclude_crawl: vec![],
        }
    }

    fn engine(
        limits: CrawlLimits,
        pages: StubPages,
        resources: StubResources,
        dir: &TempDir,
    ) -> Engine<StubResources> {
        let frontier = Arc::new(Frontier::new(limits.max_files));
        let store = LocalStore::new(dir.path()).unwrap();
        Engine::new(limits, frontier, Box::new(pages), resources, store, None)
    }

    #[tokio::test]
    async fn test_downloads_allowed_extension_and_skips_off_domain() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[(
            "https://example.com/",
            &["https://example.com/doc.pdf", "https://other.org/x"],
        )]);
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(1, 0, &["pdf"]), pages, resources, &tmp);
        let summary = engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        assert_eq!(summary.downloaded, 1);
        assert!(tmp.path().join("doc.pdf").exists());
        // The off-domain link was neither downloaded nor crawled
        let loaded = loaded.lock().unwrap();
        assert!(!loaded.iter().any(|u| u.contains("other.org")));
    }

    #[tokio::test]
    async fn test_depth_limit_stops_recursion() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[
            ("https://example.com/", &["https://example.com/level1"]),
            (
                "https://example.com/level1",
                &["https://example.com/level2"],
            ),
            (
                "https://example.com/level2",
                &["https://example.com/level3"],
            ),
        ]);
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(2, 0, &["pdf"]), pages, resources, &tmp);
        engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        let loaded = loaded.lock().unwrap();
        assert!(loaded.contains(&"https://example.com/level1".to_string()));
        assert!(!loaded.contains(&"https://example.com/level2".to_string()));
        assert!(!loaded.contains(&"https://example.com/level3".to_string()));
    }

    #[tokio::test]
    async fn test_unbounded_depth_follows_whole_chain() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[
            ("https://example.com/", &["https://example.com/a"]),
            ("https://example.com/a", &["https://example.com/b"]),
            ("https://example.com/b", &["https://example.com/c"]),
            ("https://example.com/c", &[]),
        ]);
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(0, 0, &["pdf"]), pages, resources, &tmp);
        engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        assert_eq!(loaded.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_cycle_broken_by_visited_set() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[
            ("https://example.com/a", &["https://example.com/b"]),
            ("https://example.com/b", &["https://example.com/a"]),
        ]);
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(0, 0, &["pdf"]), pages, resources, &tmp);
        engine
            .run(Url::parse("https://example.com/a").unwrap())
            .await
            .unwrap();

        let loaded = loaded.lock().unwrap();
        assert_eq!(loaded.len(), 2, "each page loaded exactly once");
    }

    #[tokio::test]
    async fn test_max_files_caps_downloads_without_stopping_link_processing() {
        let tmp = TempDir::new().unwrap();
        let (pages, _) = StubPages::new(&[(
            "https://example.com/",
            &[
                "https://example.com/one.pdf",
                "https://example.com/two.pdf",
                "https://example.com/three.pdf",
            ],
        )]);
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(1, 1, &["pdf"]), pages, resources, &tmp);
        let summary = engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        assert_eq!(summary.downloaded, 1);
        let saved = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(saved, 1, "exactly one file saved");
    }

    #[tokio::test]
    async fn test_budget_exhaustion_halts_remaining_tasks() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[
            (
                "https://example.com/",
                &["https://example.com/doc.pdf", "https://example.com/next"],
            ),
            ("https://example.com/next", &[]),
        ]);
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(0, 1, &["pdf"]), pages, resources, &tmp);
        engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        // The queued recursion died at the task boundary once the budget
        // was gone
        let loaded = loaded.lock().unwrap();
        assert!(!loaded.contains(&"https://example.com/next".to_string()));
    }

    #[tokio::test]
    async fn test_page_load_failure_skips_but_continues() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[
            (
                "https://example.com/",
                &["https://example.com/broken", "https://example.com/fine"],
            ),
            ("https://example.com/fine", &["https://example.com/doc.pdf"]),
        ]);
        let pages = pages.with_failing("https://example.com/broken");
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(0, 0, &["pdf"]), pages, resources, &tmp);
        let summary = engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        let loaded = loaded.lock().unwrap();
        assert!(loaded.contains(&"https://example.com/fine".to_string()));
        assert_eq!(summary.downloaded, 1);
    }

    #[tokio::test]
    async fn test_failed_download_not_counted() {
        let tmp = TempDir::new().unwrap();
        let (pages, _) = StubPages::new(&[(
            "https://example.com/",
            &["https://example.com/bad.pdf", "https://example.com/good.pdf"],
        )]);
        let resources = StubResources::new(&[]).with_broken_body("https://example.com/bad.pdf");

        let mut engine = engine(limits(1, 0, &["pdf"]), pages, resources, &tmp);
        let summary = engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        assert_eq!(summary.downloaded, 1);
        assert!(tmp.path().join("good.pdf").exists());
        assert!(!tmp.path().join("bad.pdf").exists());
    }

    #[tokio::test]
    async fn test_crawl_exclusion_skips_page() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[
            (
                "https://example.com/",
                &["https://example.com/private/area"],
            ),
            ("https://example.com/private/area", &[]),
        ]);
        let resources = StubResources::new(&[]);

        let mut l = limits(0, 0, &["pdf"]);
        l.exclude_crawl = vec!["/private/".to_string()];

        let mut engine = engine(l, pages, resources, &tmp);
        engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        // The excluded task terminates before any fetch
        let loaded = loaded.lock().unwrap();
        assert!(!loaded.contains(&"https://example.com/private/area".to_string()));
    }

    #[tokio::test]
    async fn test_download_exclusion_skips_file() {
        let tmp = TempDir::new().unwrap();
        let (pages, _) = StubPages::new(&[(
            "https://example.com/",
            &[
                "https://example.com/keep.pdf",
                "https://example.com/skip-me.pdf",
            ],
        )]);
        let resources = StubResources::new(&[]);

        let mut l = limits(1, 0, &["pdf"]);
        l.exclude_download = vec!["skip-me".to_string()];

        let mut engine = engine(l, pages, resources, &tmp);
        let summary = engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        assert_eq!(summary.downloaded, 1);
        assert!(tmp.path().join("keep.pdf").exists());
        assert!(!tmp.path().join("skip-me.pdf").exists());
    }

    #[tokio::test]
    async fn test_existing_file_not_fetched_again() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("doc.pdf"), b"original").unwrap();

        let (pages, _) = StubPages::new(&[(
            "https://example.com/",
            &["https://example.com/doc.pdf"],
        )]);
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(1, 0, &["pdf"]), pages, resources, &tmp);
        let summary = engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        assert_eq!(summary.downloaded, 0);
        // Untouched
        assert_eq!(
            std::fs::read(tmp.path().join("doc.pdf")).unwrap(),
            b"original"
        );
    }

    #[tokio::test]
    async fn test_html_page_saved_and_recursed_when_requested() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[
            ("https://example.com/", &["https://example.com/about"]),
            ("https://example.com/about", &[]),
        ]);
        let resources = StubResources::new(&[
            ("https://example.com/", "text/html"),
            ("https://example.com/about", "text/html"),
        ]);

        let mut engine = engine(limits(2, 0, &["html"]), pages, resources, &tmp);
        let summary = engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        // Saved as a file and followed as a page
        assert!(tmp.path().join("about.html").exists());
        assert!(loaded
            .lock()
            .unwrap()
            .contains(&"https://example.com/about".to_string()));
        assert_eq!(summary.downloaded, 1);
    }

    #[tokio::test]
    async fn test_unclassified_links_dropped() {
        let tmp = TempDir::new().unwrap();
        let (pages, loaded) = StubPages::new(&[(
            "https://example.com/",
            &["https://example.com/image.jpg"],
        )]);
        let resources = StubResources::new(&[]);

        let mut engine = engine(limits(0, 0, &["pdf"]), pages, resources, &tmp);
        let summary = engine
            .run(Url::parse("https://example.com/").unwrap())
            .await
            .unwrap();

        assert_eq!(summary.downloaded, 0);
        assert_eq!(loaded.lock().unwrap().len(), 1);
    }
}
