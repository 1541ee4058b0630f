use url::Url;

/// Lowercases a host and strips a leading `www.` and any trailing dot
///
/// # Examples
///
/// ```
/// use price_scout::url::normalize_host;
///
/// assert_eq!(normalize_host("WWW.Example.COM"), "example.com");
/// assert_eq!(normalize_host("shop.example.com."), "shop.example.com");
/// ```
pub fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Extracts the normalized host from a URL
///
/// Returns `None` if the URL has no host.
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(normalize_host)
}

/// Checks if a host matches a domain pattern
///
/// Supported pattern forms:
/// 1. Exact: `"example.com"` matches only `example.com`
/// 2. Wildcard: `"*.example.com"` matches `example.com` and any subdomain
/// 3. Any suffix: `"amazon.*"` matches `amazon.com`, `amazon.co.uk`, ...
/// 4. Both: `"*.amazon.*"` also matches subdomains such as `smile.amazon.de`
///
/// The host is normalized before comparison, so `www.` never matters.
///
/// # Examples
///
/// ```
/// use price_scout::url::matches_domain;
///
/// assert!(matches_domain("example.com", "www.example.com"));
/// assert!(matches_domain("*.example.com", "api.v2.example.com"));
/// assert!(!matches_domain("*.example.com", "notexample.com"));
/// assert!(matches_domain("*.amazon.*", "www.amazon.co.uk"));
/// ```
pub fn matches_domain(pattern: &str, host: &str) -> bool {
    let host = normalize_host(host);
    let pattern = pattern.to_lowercase();

    let (wildcard, base) = match pattern.strip_prefix("*.") {
        Some(base) => (true, base),
        None => (false, pattern.as_str()),
    };

    if base.is_empty() || host.is_empty() {
        return false;
    }

    if let Some(brand) = base.strip_suffix(".*") {
        let prefix = format!("{}.", brand);
        if host.starts_with(&prefix) && host.len() > prefix.len() {
            return true;
        }
        // Subdomain form: the brand label appears after at least one label
        return wildcard && host.contains(&format!(".{}", prefix));
    }

    if wildcard {
        host == base || host.ends_with(&format!(".{}", base))
    } else {
        host == base
    }
}
