//! Siterip: a depth-bounded site crawler and file downloader
//!
//! This crate crawls a web site from a starting URL, classifies each
//! discovered link as a page to keep crawling or a file to fetch, and
//! downloads qualifying files to a local directory, optionally mirroring
//! them to a remote object-storage container.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Siterip operations
#[derive(Debug, Error)]
pub enum SiteripError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Content type could not be determined for {url}")]
    ContentTypeUnavailable { url: String },

    #[error("WebDriver session error: {0}")]
    WebDriverSession(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command error: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("Remote storage error: {0}")]
    Remote(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Siterip operations
pub type Result<T> = std::result::Result<T, SiteripError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlLimits};
pub use crawler::{classify, crawl, CrawlSummary, Frontier, ResourceKind};
pub use crate::url::{host_of, path_extension};
