//! Plain-HTTP fetching implementations
//!
//! This module implements both collaborator contracts over reqwest:
//! - [`HttpPageFetcher`] fetches a page body and extracts hyperlinks with
//!   scraper, resolving relative hrefs against the final response URL
//! - [`HttpResourceFetcher`] sniffs content types (HEAD, then a streamed
//!   GET inspected for headers only) and streams download bodies

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::fetch::{BodyStream, PageFetcher, ResourceFetcher};
use crate::url::parse_candidate;
use crate::{Result, SiteripError};

/// Builds the HTTP client shared by the plain-HTTP fetchers
pub fn build_http_client() -> std::result::Result<Client, reqwest::Error> {
    let user_agent = format!("siterip/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A page loaded into the fetcher's session
struct LoadedPage {
    /// Final URL after redirects, used as the base for relative hrefs
    base: Url,
    body: String,
}

/// Page fetcher backed by plain HTTP requests
///
/// Suitable for sites whose navigation does not require script
/// execution; the WebDriver fetcher covers the rest.
pub struct HttpPageFetcher {
    client: Client,
    current: Option<LoadedPage>,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current: None,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn load(&mut self, url: &Url) -> Result<()> {
        self.current = None;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SiteripError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let base = response.url().clone();
        let body = response.text().await?;
        self.current = Some(LoadedPage { base, body });
        Ok(())
    }

    async fn outbound_links(&mut self) -> Result<HashSet<Url>> {
        match &self.current {
            Some(page) => Ok(extract_links(&page.body, &page.base)),
            None => Ok(HashSet::new()),
        }
    }
}

/// Extracts absolute http(s) hyperlinks from an HTML body
///
/// Relative hrefs are resolved against `base` (the final response URL),
/// matching what a browser would report for each anchor. Unparseable or
/// non-web hrefs are omitted.
fn extract_links(body: &str, base: &Url) -> HashSet<Url> {
    let document = Html::parse_document(body);
    let mut links = HashSet::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let href = href.trim();
            if href.is_empty() || href.starts_with('#') {
                continue;
            }

            let resolved = match parse_candidate(href) {
                Ok(url) => Some(url),
                // Relative href: resolve against the page URL
                Err(_) => base
                    .join(href)
                    .ok()
                    .filter(|u| u.scheme() == "http" || u.scheme() == "https"),
            };

            if let Some(url) = resolved {
                links.insert(url);
            }
        }
    }

    links
}

/// Resource fetcher backed by plain HTTP requests
#[derive(Clone)]
pub struct HttpResourceFetcher {
    client: Client,
}

impl HttpResourceFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Reads the content-type header from a response, if present.
    fn header_content_type(response: &reqwest::Response) -> Option<String> {
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
    }
}

#[async_trait]
impl ResourceFetcher for HttpResourceFetcher {
    async fn content_type(&self, url: &Url) -> Result<String> {
        // First attempt: HEAD
        if let Ok(response) = self.client.head(url.clone()).send().await {
            if response.status().is_success() {
                if let Some(content_type) = Self::header_content_type(&response) {
                    return Ok(content_type);
                }
            }
        }

        // Fallback: streamed GET, headers only; the body is dropped unread
        match self.client.get(url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                Self::header_content_type(&response).ok_or_else(|| {
                    SiteripError::ContentTypeUnavailable {
                        url: url.to_string(),
                    }
                })
            }
            _ => Err(SiteripError::ContentTypeUnavailable {
                url: url.to_string(),
            }),
        }
    }

    async fn body(&self, url: &Url) -> Result<BodyStream> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SiteripError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(SiteripError::from));
        Ok(Box::pin(stream))
    }
}
