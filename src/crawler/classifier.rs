//! Link classification
//!
//! Decides, for an arbitrary discovered link, whether it is a page to
//! keep crawling, a file to download, or neither. Classification is
//! syntactic where the extension is decisive and falls back to
//! content-type sniffing where it is not: extensions are unreliable for
//! URLs with no extension at all (most site navigation) and for pages
//! that only look like files, so the HTTP headers are the authority for
//! anything HTML-shaped.

use url::Url;

use crate::config::CrawlLimits;
use crate::fetch::ResourceFetcher;
use crate::url::path_extension;

/// What a discovered link represents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// An HTML page: a traversal candidate, and a download candidate when
    /// `html` is among the requested extensions
    Page,

    /// A downloadable file with its classified extension
    File(String),

    /// Neither; the link is dropped
    Unclassified,
}

/// Classifies a link against the configured extension set.
///
/// - A non-empty extension from the allowed set (other than `html`)
///   classifies as [`ResourceKind::File`] with no network traffic.
/// - An HTML-shaped link (no extension, or `html`/`htm`) is confirmed by
///   content-type sniffing when `html` downloads were requested, since a
///   wrong call would save a non-page under an `.html` name; the probe
///   issues a HEAD and falls back to a streamed GET. Without `html` in
///   the set nothing is downloaded, so the link counts as a page
///   outright, as site navigation overwhelmingly is.
/// - Everything else is [`ResourceKind::Unclassified`].
///
/// Sniffing failure on both attempts yields `Unclassified`; the caller
/// drops the link and the crawl continues.
pub async fn classify<R: ResourceFetcher>(
    url: &Url,
    limits: &CrawlLimits,
    resources: &R,
) -> ResourceKind {
    let ext = path_extension(url);

    if !ext.is_empty() && ext != "html" && limits.wants(&ext) {
        return ResourceKind::File(ext);
    }

    let html_shaped = ext.is_empty() || ext == "html" || ext == "htm";
    if html_shaped {
        if !limits.wants("html") {
            return ResourceKind::Page;
        }

        return match resources.content_type(url).await {
            Ok(content_type) if content_type.contains("text/html") => ResourceKind::Page,
            Ok(content_type) => {
                tracing::debug!("Not a page ({}): {}", content_type, url);
                ResourceKind::Unclassified
            }
            Err(e) => {
                tracing::debug!("Content-type sniffing failed for {}: {}", url, e);
                ResourceKind::Unclassified
            }
        };
    }

    ResourceKind::Unclassified
}
