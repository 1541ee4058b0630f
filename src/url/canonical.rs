use crate::url::domain::normalize_host;
use crate::UrlError;
use url::Url;

/// Query parameters that never change which product a page shows
const TRACKING_PARAMS: &[&str] = &[
    "fbclid",
    "gclid",
    "gclsrc",
    "dclid",
    "msclkid",
    "mc_eid",
    "srsltid",
    "ref",
    "ref_",
    "tag",
    "source",
];

/// Builds a comparison key for de-duplicating resolved product links
///
/// Two links with the same key point at the same page for extraction
/// purposes. The key is built from:
///
/// - the host, lowercased and without `www.` (the scheme is ignored)
/// - the path with empty segments and any trailing slash removed
/// - the query with tracking parameters dropped and keys sorted
///
/// The fragment never participates.
///
/// # Examples
///
/// ```
/// use price_scout::url::canonical_key;
///
/// let a = canonical_key("https://www.Shop.com/item/42/?utm_source=x#reviews").unwrap();
/// let b = canonical_key("http://shop.com/item/42").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn canonical_key(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url
        .host_str()
        .map(normalize_host)
        .filter(|h| !h.is_empty())
        .ok_or(UrlError::MissingDomain)?;

    let path = url
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    let mut key = format!("{}/{}", host, path);
    if !params.is_empty() {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        key.push('?');
        key.push_str(&query);
    }

    Ok(key)
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&key.as_str()) || key.starts_with("utm_")
}
