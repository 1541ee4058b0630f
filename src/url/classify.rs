use crate::url::domain::extract_domain;
use crate::url::rules::{PageKind, RuleOrigin, RuleTable};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

/// Path segments that are followed by a product identifier or slug
const PRODUCT_MARKERS: &[&str] = &[
    "product", "products", "item", "items", "p", "dp", "ip", "itm", "listing", "pd", "prod",
];

/// Minimum length for a final path segment to count as a product slug
const MIN_SLUG_LEN: usize = 12;

lazy_static! {
    static ref NUMERIC_ID_TAIL: Regex = Regex::new(r"\d{4,}(\.[A-Za-z]{1,5})?$").unwrap();
    static ref ASIN_LIKE: Regex = Regex::new(r"^[A-Z0-9]{10}$").unwrap();
    static ref SLUG: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._~-]*$").unwrap();
    static ref DEFAULT_CLASSIFIER: PageClassifier = PageClassifier::default();
}

/// Result of classifying a URL against the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: PageKind,
    pub origin: RuleOrigin,
}

/// Page classifier over a rule table
///
/// The classifier is a pure function of the URL and its table: the same
/// URL always gets the same verdict.
#[derive(Debug, Clone, Default)]
pub struct PageClassifier {
    table: RuleTable,
}

impl PageClassifier {
    /// Creates a classifier over the given rule table
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// Finds the first rule that matches the URL
    ///
    /// Returns `None` for URLs that fail to parse and for URLs no rule
    /// has an opinion about.
    pub fn classify(&self, url: &str) -> Option<Classification> {
        let parsed = Url::parse(url).ok()?;
        let host = extract_domain(&parsed)?;
        self.table
            .first_match(&parsed, &host)
            .map(|rule| Classification {
                kind: rule.verdict,
                origin: rule.origin,
            })
    }

    /// Returns true if the URL looks like a search or listing page
    pub fn is_search_or_collection_page(&self, url: &str) -> bool {
        matches!(
            self.classify(url),
            Some(Classification {
                kind: PageKind::Search | PageKind::Collection,
                ..
            })
        )
    }

    /// Returns true if the URL carries a positive single-product signal
    ///
    /// A domain-scoped rule decides outright. Otherwise any of these count:
    /// - a product marker segment (`product`, `item`, `dp`, ...) followed by another segment
    /// - a final segment ending in a numeric id of at least four digits
    /// - a segment that looks like a 10-character catalog code (`B000123456`)
    /// - a final segment that is a long hyphenated slug
    pub fn is_likely_product_page(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };
        let host = match extract_domain(&parsed) {
            Some(host) => host,
            None => return false,
        };

        if let Some(rule) = self.table.first_scoped_match(&parsed, &host) {
            return rule.verdict == PageKind::Product;
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        has_product_marker(&segments) || has_product_identifier(&segments)
    }

    /// Decides whether a resolved link should be dropped before extraction
    ///
    /// Only explicit negative signals drop a page. Search verdicts always
    /// drop; collection verdicts drop unless they came from a generic path
    /// marker and the URL also carries a product signal.
    pub fn should_discard(&self, url: &str) -> Option<PageKind> {
        let classification = self.classify(url)?;
        match classification.kind {
            PageKind::Product => None,
            PageKind::Search => Some(PageKind::Search),
            PageKind::Collection => {
                if classification.origin == RuleOrigin::GenericPath
                    && self.is_likely_product_page(url)
                {
                    None
                } else {
                    Some(PageKind::Collection)
                }
            }
        }
    }
}

fn has_product_marker(segments: &[&str]) -> bool {
    segments
        .windows(2)
        .any(|pair| PRODUCT_MARKERS.iter().any(|m| pair[0].eq_ignore_ascii_case(m)))
}

fn has_product_identifier(segments: &[&str]) -> bool {
    let last = match segments.last() {
        Some(last) => *last,
        None => return false,
    };

    if NUMERIC_ID_TAIL.is_match(last) {
        return true;
    }

    if segments
        .iter()
        .any(|s| ASIN_LIKE.is_match(s) && s.chars().any(|c| c.is_ascii_digit()))
    {
        return true;
    }

    last.len() >= MIN_SLUG_LEN && last.contains('-') && SLUG.is_match(last)
}

/// Classifies with the built-in rule table
///
/// # Examples
///
/// ```
/// use price_scout::url::is_search_or_collection_page;
///
/// assert!(is_search_or_collection_page("https://shop.example.com/search?q=kettle"));
/// assert!(is_search_or_collection_page("https://shop.example.com/category/kettles"));
/// assert!(!is_search_or_collection_page("https://shop.example.com/item/kettle-1234"));
/// ```
pub fn is_search_or_collection_page(url: &str) -> bool {
    DEFAULT_CLASSIFIER.is_search_or_collection_page(url)
}

/// Checks product-page signals with the built-in rule table
///
/// # Examples
///
/// ```
/// use price_scout::url::is_likely_product_page;
///
/// assert!(is_likely_product_page("https://www.amazon.com/dp/B000123456"));
/// assert!(!is_likely_product_page("https://www.amazon.com/s?k=kettle"));
/// ```
pub fn is_likely_product_page(url: &str) -> bool {
    DEFAULT_CLASSIFIER.is_likely_product_page(url)
}
