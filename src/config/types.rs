use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Full configuration for a crawl run
#[derive(Debug, Clone)]
pub struct Config {
    /// The URL traversal starts from (depth 1)
    pub start_url: Url,

    /// Directory downloaded files are written to
    pub download_dir: PathBuf,

    /// Traversal limits and filters
    pub limits: CrawlLimits,

    /// Render pages in a WebDriver browser session instead of plain HTTP
    pub js: bool,

    /// Remote mirroring, when enabled
    pub upload: Option<UploadConfig>,
}

/// Immutable limits and filters applied during traversal
#[derive(Debug, Clone)]
pub struct CrawlLimits {
    /// Maximum link-hop depth; the starting URL is depth 1. 0 = unbounded.
    pub max_depth: u32,

    /// Maximum number of files to download. 0 = unbounded.
    pub max_files: usize,

    /// Restrict traversal to the starting URL's host
    pub stay_on_domain: bool,

    /// Extensions (bare, lower-cased) that qualify a link for download
    pub extensions: Vec<String>,

    /// Pause between outbound requests
    pub delay: Duration,

    /// URL substrings excluded from downloading
    pub exclude_download: Vec<String>,

    /// URL substrings excluded from crawling
    pub exclude_crawl: Vec<String>,
}

impl CrawlLimits {
    /// Returns true if the given extension is in the allowed set.
    ///
    /// Expects a bare, lower-cased extension (no leading dot).
    pub fn wants(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    /// Returns true if `depth` has reached the depth limit.
    ///
    /// A `max_depth` of 0 means unbounded, so this never returns true.
    pub fn depth_reached(&self, depth: u32) -> bool {
        self.max_depth != 0 && depth >= self.max_depth
    }
}

/// Remote mirroring configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Name of the remote object-storage container
    pub container: String,
}
