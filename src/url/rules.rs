//! Declarative page classification rules
//!
//! A rule pairs an optional domain scope with a URL pattern and a verdict.
//! Rules are evaluated in table order and the first match wins, so the
//! table itself encodes precedence: configured rules, then marketplace
//! rules, then the generic search/collection markers.

use crate::config::RuleEntry;
use crate::url::domain::matches_domain;
use crate::ConfigError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use url::Url;

/// What kind of page a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A search results page
    Search,
    /// A category, collection, or other listing page
    Collection,
    /// A single purchasable item
    Product,
}

impl PageKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "search" => Some(Self::Search),
            "collection" => Some(Self::Collection),
            "product" => Some(Self::Product),
            _ => None,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Search => "search",
            Self::Collection => "collection",
            Self::Product => "product",
        };
        write!(f, "{}", s)
    }
}

/// Where the winning rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleOrigin {
    /// A rule supplied through configuration
    Configured,
    /// A built-in rule for a specific marketplace
    Domain,
    /// A built-in generic path marker
    GenericPath,
    /// A built-in generic query parameter rule
    Query,
}

/// Search query keys shared by most storefronts
pub const SEARCH_PARAMS: &[&str] = &[
    "q",
    "query",
    "search",
    "keyword",
    "keywords",
    "term",
    "searchterm",
    "search_query",
    "s",
    "k",
    "p",
];

/// Query keys that narrow a listing
pub const FILTER_PARAMS: &[&str] = &["category", "cat", "collection", "tag", "filter", "sort"];

/// Query keys that page through a listing
pub const PAGINATION_PARAMS: &[&str] = &["page", "offset", "start", "limit"];

const SEARCH_SEGMENTS: &[&str] = &[
    "search",
    "results",
    "find",
    "query",
    "searchresults",
    "search-results",
    "suche",
    "recherche",
    "buscar",
    "busqueda",
    "ricerca",
    "zoeken",
];

const COLLECTION_SEGMENTS: &[&str] = &[
    "category",
    "categories",
    "collection",
    "collections",
    "browse",
    "catalog",
    "catalogue",
    "tag",
    "tags",
    "department",
    "departments",
];

lazy_static! {
    // `/search.php`, `/searchresults`, `/catalogsearch/result`, ...
    static ref SEARCH_IN_PATH: Regex = Regex::new(r"(?i)/search|catalogsearch").unwrap();
}

const COLLECTION_ROOTS: &[&str] = &["/products", "/shop", "/store", "/collections"];

/// A URL pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Some path segment equals the marker (case-insensitive)
    Segment(String),
    /// The path starts with the prefix (case-insensitive)
    PathPrefix(String),
    /// The whole path equals the value, ignoring a trailing slash
    PathExact(String),
    /// The query string carries the key (case-insensitive)
    QueryKey(String),
    /// The path matches the regular expression
    PathRegex(Regex),
    /// Two distinct filter keys, or one filter key plus a pagination key
    FilterQuery,
}

impl Pattern {
    /// Parses `kind:value` as used in configuration
    ///
    /// Kinds are `segment`, `prefix`, `exact`, `query`, and `regex`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let (kind, value) = spec.split_once(':').ok_or_else(|| {
            ConfigError::InvalidPattern(format!("Pattern '{}' must look like kind:value", spec))
        })?;

        if value.is_empty() {
            return Err(ConfigError::InvalidPattern(format!(
                "Pattern '{}' has an empty value",
                spec
            )));
        }

        match kind.trim().to_ascii_lowercase().as_str() {
            "segment" => Ok(Self::Segment(value.to_string())),
            "prefix" => Ok(Self::PathPrefix(value.to_string())),
            "exact" => Ok(Self::PathExact(value.to_string())),
            "query" => Ok(Self::QueryKey(value.to_string())),
            "regex" => Regex::new(value)
                .map(Self::PathRegex)
                .map_err(|e| ConfigError::InvalidPattern(format!("Bad regex '{}': {}", value, e))),
            other => Err(ConfigError::InvalidPattern(format!(
                "Unknown pattern kind '{}' in '{}'",
                other, spec
            ))),
        }
    }

    /// Checks the pattern against a parsed URL
    pub fn matches(&self, url: &Url) -> bool {
        match self {
            Self::Segment(marker) => url
                .path_segments()
                .map(|mut segments| segments.any(|s| s.eq_ignore_ascii_case(marker)))
                .unwrap_or(false),
            Self::PathPrefix(prefix) => url
                .path()
                .to_ascii_lowercase()
                .starts_with(&prefix.to_ascii_lowercase()),
            Self::PathExact(exact) => {
                trim_trailing_slash(&url.path().to_ascii_lowercase())
                    == trim_trailing_slash(&exact.to_ascii_lowercase())
            }
            Self::QueryKey(key) => url.query_pairs().any(|(k, _)| k.eq_ignore_ascii_case(key)),
            Self::PathRegex(regex) => regex.is_match(url.path()),
            Self::FilterQuery => {
                let mut filters: Vec<String> = Vec::new();
                let mut paginated = false;
                for (key, _) in url.query_pairs() {
                    let key = key.to_ascii_lowercase();
                    if FILTER_PARAMS.contains(&key.as_str()) {
                        if !filters.contains(&key) {
                            filters.push(key);
                        }
                    } else if PAGINATION_PARAMS.contains(&key.as_str()) {
                        paginated = true;
                    }
                }
                filters.len() >= 2 || (filters.len() == 1 && paginated)
            }
        }
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// One row of the classification table
#[derive(Debug, Clone)]
pub struct ClassifierRule {
    /// Domain pattern the rule is limited to; applies everywhere when `None`
    pub scope: Option<String>,
    pub pattern: Pattern,
    pub verdict: PageKind,
    pub origin: RuleOrigin,
}

impl ClassifierRule {
    fn builtin(
        scope: Option<&str>,
        pattern: Pattern,
        verdict: PageKind,
        origin: RuleOrigin,
    ) -> Self {
        Self {
            scope: scope.map(str::to_string),
            pattern,
            verdict,
            origin,
        }
    }

    /// Compiles a rule from a configuration entry
    pub fn from_entry(entry: &RuleEntry) -> Result<Self, ConfigError> {
        let verdict = PageKind::parse(&entry.verdict).ok_or_else(|| {
            ConfigError::InvalidPattern(format!(
                "Unknown verdict '{}' (expected search, collection, or product)",
                entry.verdict
            ))
        })?;

        Ok(Self {
            scope: entry.domain.clone(),
            pattern: Pattern::parse(&entry.pattern)?,
            verdict,
            origin: RuleOrigin::Configured,
        })
    }

    /// Returns true if the rule applies to the host
    pub fn in_scope(&self, host: &str) -> bool {
        match &self.scope {
            Some(pattern) => matches_domain(pattern, host),
            None => true,
        }
    }

    /// Returns true if the rule is limited to particular domains
    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }
}

/// Ordered list of classification rules
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<ClassifierRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleTable {
    /// The built-in marketplace and generic rules
    pub fn builtin() -> Self {
        let mut rules = marketplace_rules();
        rules.extend(generic_rules());
        Self { rules }
    }

    /// Built-in rules preceded by configured ones
    pub fn with_configured(entries: &[RuleEntry]) -> Result<Self, ConfigError> {
        let mut rules = entries
            .iter()
            .map(ClassifierRule::from_entry)
            .collect::<Result<Vec<_>, _>>()?;
        rules.extend(Self::builtin().rules);
        Ok(Self { rules })
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    /// First rule that applies to the URL on the given host
    pub fn first_match(&self, url: &Url, host: &str) -> Option<&ClassifierRule> {
        self.rules
            .iter()
            .find(|rule| rule.in_scope(host) && rule.pattern.matches(url))
    }

    /// First domain-scoped rule that applies to the URL on the given host
    pub fn first_scoped_match(&self, url: &Url, host: &str) -> Option<&ClassifierRule> {
        self.rules
            .iter()
            .filter(|rule| rule.is_scoped())
            .find(|rule| rule.in_scope(host) && rule.pattern.matches(url))
    }
}

fn marketplace_rules() -> Vec<ClassifierRule> {
    use PageKind::{Collection, Product, Search};

    // Product rules come first within each marketplace
    let table: &[(&str, &str, PageKind)] = &[
        ("*.amazon.*", "segment:dp", Product),
        ("*.amazon.*", "prefix:/gp/product/", Product),
        ("*.amazon.*", "prefix:/gp/aw/d/", Product),
        ("*.amazon.*", "exact:/s", Search),
        ("*.amazon.*", "prefix:/s/", Search),
        ("*.amazon.*", "exact:/b", Collection),
        ("*.amazon.*", "prefix:/b/", Collection),
        ("*.amazon.*", "prefix:/gp/browse", Collection),
        ("*.amazon.*", "prefix:/stores/", Collection),
        ("*.ebay.*", "prefix:/itm/", Product),
        ("*.ebay.*", "prefix:/sch/", Search),
        ("*.ebay.*", "prefix:/b/", Collection),
        ("*.walmart.*", "prefix:/ip/", Product),
        ("*.walmart.*", "prefix:/search", Search),
        ("*.walmart.*", "prefix:/browse/", Collection),
        ("*.walmart.*", "prefix:/cp/", Collection),
        ("*.target.com", "prefix:/p/", Product),
        ("*.target.com", "exact:/s", Search),
        ("*.target.com", "prefix:/s/", Search),
        ("*.target.com", "prefix:/c/", Collection),
        ("*.etsy.com", "prefix:/listing/", Product),
        ("*.etsy.com", "prefix:/search", Search),
        ("*.etsy.com", "prefix:/market/", Search),
        ("*.etsy.com", "prefix:/c/", Collection),
        ("*.bestbuy.com", r"regex:^/site/.+\.p$", Product),
        ("*.bestbuy.com", "prefix:/site/searchpage.jsp", Search),
        ("*.bestbuy.com", r"regex:^/site/.+\.c$", Collection),
        ("*.aliexpress.*", "prefix:/item/", Product),
        ("*.aliexpress.*", "prefix:/w/", Search),
        ("*.aliexpress.*", "prefix:/wholesale", Search),
        ("*.aliexpress.*", "prefix:/category/", Collection),
        ("*.homedepot.com", "prefix:/p/", Product),
        ("*.homedepot.com", "prefix:/s/", Search),
        ("*.homedepot.com", "prefix:/b/", Collection),
        ("*.google.*", "prefix:/shopping/product/", Product),
        ("*.google.*", "prefix:/search", Search),
    ];

    table
        .iter()
        .filter_map(|(scope, spec, verdict)| {
            // Built-in specs are static and covered by tests
            Pattern::parse(spec).ok().map(|pattern| {
                ClassifierRule::builtin(Some(*scope), pattern, *verdict, RuleOrigin::Domain)
            })
        })
        .collect()
}

fn generic_rules() -> Vec<ClassifierRule> {
    let mut rules = Vec::new();

    for segment in SEARCH_SEGMENTS {
        rules.push(ClassifierRule::builtin(
            None,
            Pattern::Segment(segment.to_string()),
            PageKind::Search,
            RuleOrigin::GenericPath,
        ));
    }

    rules.push(ClassifierRule::builtin(
        None,
        Pattern::PathRegex(SEARCH_IN_PATH.clone()),
        PageKind::Search,
        RuleOrigin::GenericPath,
    ));

    for segment in COLLECTION_SEGMENTS {
        rules.push(ClassifierRule::builtin(
            None,
            Pattern::Segment(segment.to_string()),
            PageKind::Collection,
            RuleOrigin::GenericPath,
        ));
    }

    for root in COLLECTION_ROOTS {
        rules.push(ClassifierRule::builtin(
            None,
            Pattern::PathExact(root.to_string()),
            PageKind::Collection,
            RuleOrigin::GenericPath,
        ));
    }

    for key in SEARCH_PARAMS {
        rules.push(ClassifierRule::builtin(
            None,
            Pattern::QueryKey(key.to_string()),
            PageKind::Search,
            RuleOrigin::Query,
        ));
    }

    rules.push(ClassifierRule::builtin(
        None,
        Pattern::FilterQuery,
        PageKind::Collection,
        RuleOrigin::Query,
    ));

    rules
}
