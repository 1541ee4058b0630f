//! URL handling module for Price-Scout
//!
//! This module decides which resolved links are worth sending to
//! extraction:
//! - well-formedness and blocked-marker validation
//! - search / collection / product page classification
//! - domain pattern matching
//! - canonical keys for de-duplication

mod canonical;
mod classify;
mod domain;
pub mod rules;
mod validate;

// Re-export main functions
pub use canonical::canonical_key;
pub use classify::{
    is_likely_product_page, is_search_or_collection_page, Classification, PageClassifier,
};
pub use domain::{extract_domain, matches_domain, normalize_host};
pub use rules::{ClassifierRule, PageKind, Pattern, RuleOrigin, RuleTable};
pub use validate::{is_valid_url, UrlValidator};
