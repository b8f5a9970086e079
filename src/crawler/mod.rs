//! Crawler module: classification, frontier tracking, and traversal
//!
//! This module contains the decision core of the crawl:
//! - Link classification (download, recurse, or drop)
//! - Frontier tracking (visited-set dedup and the download budget)
//! - The traversal engine driving both over the fetching collaborators

mod classifier;
mod engine;
mod frontier;

pub use classifier::{classify, ResourceKind};
pub use engine::{CrawlSummary, Engine, Task};
pub use frontier::Frontier;

use std::sync::Arc;

use crate::config::Config;
use crate::fetch::webdriver::webdriver_url_from_env;
use crate::fetch::{
    build_http_client, HttpPageFetcher, HttpResourceFetcher, PageFetcher, WebDriverFetcher,
};
use crate::storage::{BlobMirror, LocalStore};
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It wires up the
/// configured collaborators (the page fetcher, plain HTTP or a WebDriver
/// session when `js` is set; the resource fetcher; local storage; the
/// optional remote mirror) and drives the traversal engine from the
/// starting URL.
///
/// Collaborator setup happens before any traversal, so a missing
/// WebDriver endpoint or unreachable remote container fails the run
/// without touching the target site.
pub async fn crawl(config: Config) -> Result<CrawlSummary> {
    let client = build_http_client()?;

    let pages: Box<dyn PageFetcher> = if config.js {
        let endpoint = webdriver_url_from_env();
        Box::new(WebDriverFetcher::connect(&endpoint).await?)
    } else {
        Box::new(HttpPageFetcher::new(client.clone()))
    };

    let resources = HttpResourceFetcher::new(client);
    let store = LocalStore::new(&config.download_dir)?;

    let mirror = match &config.upload {
        Some(upload) => Some(BlobMirror::connect(&upload.container).await?),
        None => None,
    };

    let frontier = Arc::new(Frontier::new(config.limits.max_files));
    let mut engine = Engine::new(
        config.limits.clone(),
        frontier,
        pages,
        resources,
        store,
        mirror,
    );

    engine.run(config.start_url.clone()).await
}
