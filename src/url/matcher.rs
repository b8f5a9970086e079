/// Checks if a URL matches any of the given exclusion substrings
///
/// A URL matches when any pattern occurs anywhere in its string form.
/// Patterns are plain substrings, not globs or regexes; validation
/// rejects empty patterns before a crawl starts.
///
/// # Examples
///
/// ```
/// use siterip::url::matches_any;
///
/// let patterns = vec!["/private/".to_string(), "logout".to_string()];
/// assert!(matches_any("https://example.com/private/doc.pdf", &patterns));
/// assert!(matches_any("https://example.com/logout?next=/", &patterns));
/// assert!(!matches_any("https://example.com/public/doc.pdf", &patterns));
/// ```
pub fn matches_any(url: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| url.contains(p.as_str()))
}
