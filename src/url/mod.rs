//! URL handling for Siterip
//!
//! This module derives the attributes the traversal engine and classifier
//! need from a discovered link: its host (for domain scoping), the
//! syntactic extension of its path (for classification), and whether it
//! matches an exclusion substring.

mod matcher;

pub use matcher::matches_any;

use url::Url;

use crate::{UrlError, UrlResult};

/// Extracts the host of a URL for domain scoping, lowercase, with the
/// port appended when one is present (`host` or `host:port`).
///
/// Including the port distinguishes two servers on the same address,
/// which matters for locally hosted sites.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use siterip::url::host_of;
///
/// let url = Url::parse("https://Example.COM/path").unwrap();
/// assert_eq!(host_of(&url).unwrap(), "example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_of(&url).unwrap(), "127.0.0.1:8080");
/// ```
pub fn host_of(url: &Url) -> UrlResult<String> {
    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();

    match url.port() {
        Some(port) => Ok(format!("{}:{}", host, port)),
        None => Ok(host),
    }
}

/// Derives the syntactic extension from a URL's path: the text after the
/// last `.` in the last path segment, lower-cased.
///
/// Returns an empty string when the last segment has no dot, when the dot
/// is the segment's first character (dotfile names carry no extension),
/// or when the path ends in `/`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use siterip::url::path_extension;
///
/// let url = Url::parse("https://example.com/docs/report.PDF").unwrap();
/// assert_eq!(path_extension(&url), "pdf");
///
/// let url = Url::parse("https://example.com/about").unwrap();
/// assert_eq!(path_extension(&url), "");
///
/// let url = Url::parse("https://example.com/docs/").unwrap();
/// assert_eq!(path_extension(&url), "");
/// ```
pub fn path_extension(url: &Url) -> String {
    let segment = url.path().rsplit('/').next().unwrap_or("");

    match segment.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) => segment[idx + 1..].to_lowercase(),
    }
}

/// Returns the last non-empty segment of a URL's path, if any.
///
/// Used for deriving filenames from directory-style URLs such as
/// `https://example.com/page1/`.
pub fn last_path_segment(url: &Url) -> Option<&str> {
    url.path().rsplit('/').find(|s| !s.is_empty())
}

/// Parses an absolute hyperlink discovered on a page, keeping only
/// http(s) URLs. Anything else (mailto:, javascript:, fragments,
/// malformed text) is dropped.
pub fn parse_candidate(href: &str) -> UrlResult<Url> {
    let href = href.trim();

    let url = Url::parse(href).map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}
