//! Fetching collaborators: page rendering and resource retrieval
//!
//! The traversal engine talks to the network through two narrow
//! contracts. [`PageFetcher`] renders a page and reports the outbound
//! hyperlinks found on it; [`ResourceFetcher`] retrieves headers (for
//! content-type sniffing) and streamed bodies for downloads. Both have a
//! plain-HTTP implementation; page fetching additionally has a
//! WebDriver-backed one for script-rendered sites.

pub mod http;
pub mod webdriver;

pub use http::{build_http_client, HttpPageFetcher, HttpResourceFetcher};
pub use webdriver::WebDriverFetcher;

use std::collections::HashSet;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use url::Url;

use crate::Result;

/// A streamed download body
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Renders a page and extracts its outbound hyperlinks
///
/// Implementations hold a session: `load` navigates to a URL, and
/// `outbound_links` reports the absolute http(s) hyperlinks found on the
/// page loaded last. Links that cannot be read (stale elements, malformed
/// hrefs, non-web schemes) are simply omitted, never reported as errors.
#[async_trait]
pub trait PageFetcher: Send {
    /// Navigates the session to the given URL.
    async fn load(&mut self, url: &Url) -> Result<()>;

    /// Returns the set of absolute http(s) hyperlinks on the loaded page.
    async fn outbound_links(&mut self) -> Result<HashSet<Url>>;

    /// Releases the session. The default implementation does nothing.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Retrieves resource headers and bodies over HTTP
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Determines the content type of a resource without consuming its
    /// body: a HEAD request first, falling back to a streamed GET whose
    /// body is never read past the headers.
    async fn content_type(&self, url: &Url) -> Result<String>;

    /// Retrieves the resource body as a byte stream.
    async fn body(&self, url: &Url) -> Result<BodyStream>;
}
