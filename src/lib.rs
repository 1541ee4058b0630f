//! Price-Scout: product price discovery from photos or search text
//!
//! This crate identifies a product, discovers candidate shopping links,
//! resolves and filters those links down to likely product pages, and
//! extracts structured price listings from them through an external
//! page-extraction service.

pub mod config;
pub mod context;
pub mod discovery;
pub mod extract;
pub mod links;
pub mod output;
pub mod scout;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Price-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("{service} API error {status}: {body}")]
    Api {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Missing API key: environment variable {var} is not set")]
    MissingApiKey { var: String },

    #[error("Product identification failed: {0}")]
    Identification(String),

    #[error("Link discovery failed: {0}")]
    Discovery(String),

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Invalid image {path}: {reason}")]
    InvalidImage { path: String, reason: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Price-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use context::RequestContext;
pub use extract::{ExtractionClient, ExtractionResult, FailureKind};
pub use links::{LinkPreparer, RedirectResolver};
pub use scout::{ProductScout, ScoutReport};
pub use state::{JobStatus, LinkDisposition};
pub use url::{is_likely_product_page, is_search_or_collection_page, is_valid_url};
