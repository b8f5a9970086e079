//! WebDriver-backed page fetching
//!
//! Drives a headless browser through a WebDriver endpoint (chromedriver
//! or a Selenium server) so that pages whose navigation is built by
//! scripts still expose their links. The session is established once per
//! crawl and reused for every page.

use std::collections::HashSet;

use async_trait::async_trait;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use url::Url;

use crate::fetch::PageFetcher;
use crate::url::parse_candidate;
use crate::Result;

/// Default WebDriver endpoint, overridable with `WEBDRIVER_URL`
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Returns the WebDriver endpoint from the environment, or the default.
pub fn webdriver_url_from_env() -> String {
    std::env::var("WEBDRIVER_URL").unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string())
}

/// Page fetcher backed by a headless browser session
pub struct WebDriverFetcher {
    client: Client,
}

impl WebDriverFetcher {
    /// Connects a new headless browser session.
    ///
    /// A connection failure is a configuration error: the crawl must not
    /// start without its rendering collaborator.
    pub async fn connect(webdriver_url: &str) -> Result<Self> {
        let mut chrome_opts = serde_json::map::Map::new();
        let args = vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
        ];
        chrome_opts.insert(
            "args".to_string(),
            serde_json::Value::Array(args.into_iter().map(serde_json::Value::String).collect()),
        );

        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::Value::Object(chrome_opts),
        );

        tracing::debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn load(&mut self, url: &Url) -> Result<()> {
        self.client.goto(url.as_str()).await?;
        Ok(())
    }

    async fn outbound_links(&mut self) -> Result<HashSet<Url>> {
        // One round-trip; the browser reports hrefs already absolutized
        let result = self
            .client
            .execute(
                "return Array.from(document.querySelectorAll('a[href]')).map(a => a.href);",
                vec![],
            )
            .await?;

        let mut links = HashSet::new();
        if let Some(hrefs) = result.as_array() {
            for href in hrefs {
                let Some(href) = href.as_str() else {
                    continue;
                };
                if let Ok(url) = parse_candidate(href) {
                    links.insert(url);
                }
            }
        }

        Ok(links)
    }

    async fn close(&mut self) -> Result<()> {
        self.client.clone().close().await?;
        Ok(())
    }
}
