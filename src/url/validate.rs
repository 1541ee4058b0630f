use crate::url::domain::{extract_domain, matches_domain};
use url::Url;

/// Literal marker some redirect services use for pages they refuse to serve
const BLOCKED_QUERY_MARKER: &str = "/blocked?";

/// Path segment that marks a blocked landing page
const BLOCKED_SEGMENT: &str = "blocked";

/// Checks a URL for well-formedness and blocked markers
///
/// A URL is valid when:
/// - it is non-empty and starts with an explicit `http://` or `https://`
/// - it parses and has a host
/// - the host has at least two non-empty dot-separated labels
/// - it carries no blocked marker (`/blocked?` or a `blocked` path segment)
/// - its host is not covered by a configured blocked domain pattern
///
/// Malformed input is simply invalid; validation never fails with an error.
#[derive(Debug, Clone, Default)]
pub struct UrlValidator {
    blocked_domains: Vec<String>,
}

impl UrlValidator {
    /// Creates a validator that also rejects the given domain patterns
    pub fn new(blocked_domains: Vec<String>) -> Self {
        Self { blocked_domains }
    }

    /// Returns true if the URL may be handed to extraction
    pub fn is_valid(&self, url: &str) -> bool {
        let trimmed = url.trim();
        if trimmed.is_empty() || !has_explicit_http_scheme(trimmed) {
            return false;
        }

        let parsed = match Url::parse(trimmed) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        let host = match extract_domain(&parsed) {
            Some(host) if !host.is_empty() => host,
            _ => return false,
        };

        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
            return false;
        }

        if is_blocked_path(trimmed, &parsed) {
            return false;
        }

        !self
            .blocked_domains
            .iter()
            .any(|pattern| matches_domain(pattern, &host))
    }
}

/// Checks a URL with the built-in rules only
///
/// # Examples
///
/// ```
/// use price_scout::url::is_valid_url;
///
/// assert!(is_valid_url("https://shop.example.com/item/42"));
/// assert!(!is_valid_url("shop.example.com/item/42"));
/// assert!(!is_valid_url("https://localhost/item/42"));
/// assert!(!is_valid_url("https://shop.example.com/blocked?id=1"));
/// ```
pub fn is_valid_url(url: &str) -> bool {
    UrlValidator::default().is_valid(url)
}

fn has_explicit_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_blocked_path(raw: &str, url: &Url) -> bool {
    if raw.contains(BLOCKED_QUERY_MARKER) {
        return true;
    }

    url.path_segments()
        .map(|mut segments| segments.any(|s| s.eq_ignore_ascii_case(BLOCKED_SEGMENT)))
        .unwrap_or(false)
}
