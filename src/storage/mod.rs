//! Storage for downloaded files
//!
//! Downloads land in a local directory ([`LocalStore`]) and are
//! optionally mirrored to a remote object-storage container
//! ([`BlobMirror`]). Local names are derived from the URL path; a name
//! that already exists locally is treated as satisfied and skipped.

pub mod blob;
pub mod local;

pub use blob::BlobMirror;
pub use local::LocalStore;

use chrono::Utc;
use url::Url;

use crate::url::last_path_segment;

/// Derives the local filename for a download.
///
/// For regular files the final path segment is used, with the classified
/// extension appended when the name does not already end in it; a URL
/// whose path carries no final segment falls back to a timestamped name.
///
/// Pages saved as HTML take the final path segment plus `.html`. For
/// directory-style URLs (`.../page1/`) the last non-empty segment names
/// the file (`page1.html`), and a bare domain becomes `home.html`.
pub fn derive_filename(url: &Url, ext: &str) -> String {
    let basename = url.path().rsplit('/').next().unwrap_or("");

    if ext == "html" {
        if basename.is_empty() {
            return match last_path_segment(url) {
                Some(segment) => format!("{}.html", segment),
                None => "home.html".to_string(),
            };
        }

        let lower = basename.to_lowercase();
        if lower.ends_with(".html") || lower.ends_with(".htm") {
            basename.to_string()
        } else {
            format!("{}.html", basename)
        }
    } else if basename.is_empty() {
        format!("downloaded_file_{}.{}", Utc::now().timestamp(), ext)
    } else if basename.to_lowercase().ends_with(&format!(".{}", ext)) {
        basename.to_string()
    } else {
        format!("{}.{}", basename, ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_file_keeps_matching_extension() {
        assert_eq!(
            derive_filename(&url("https://example.com/docs/report.pdf"), "pdf"),
            "report.pdf"
        );
    }

    #[test]
    fn test_file_appends_missing_extension() {
        assert_eq!(
            derive_filename(&url("https://example.com/download?id=7"), "pdf"),
            "download.pdf"
        );
    }

    #[test]
    fn test_file_extension_match_is_case_insensitive() {
        assert_eq!(
            derive_filename(&url("https://example.com/REPORT.PDF"), "pdf"),
            "REPORT.PDF"
        );
    }

    #[test]
    fn test_file_empty_segment_gets_timestamped_name() {
        let name = derive_filename(&url("https://example.com/files/"), "pdf");
        assert!(name.starts_with("downloaded_file_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_page_basename_gets_html_suffix() {
        assert_eq!(
            derive_filename(&url("https://example.com/about"), "html"),
            "about.html"
        );
    }

    #[test]
    fn test_page_existing_html_suffix_kept() {
        assert_eq!(
            derive_filename(&url("https://example.com/index.html"), "html"),
            "index.html"
        );
        assert_eq!(
            derive_filename(&url("https://example.com/old.htm"), "html"),
            "old.htm"
        );
    }

    #[test]
    fn test_page_directory_url_uses_last_segment() {
        assert_eq!(
            derive_filename(&url("https://www.website.com/page1/"), "html"),
            "page1.html"
        );
    }

    #[test]
    fn test_page_bare_domain_is_home() {
        assert_eq!(
            derive_filename(&url("https://example.com/"), "html"),
            "home.html"
        );
    }
}
