//! Configuration module for Price-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to their defaults.
//!
//! # Example
//!
//! ```no_run
//! use price_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("price-scout.toml")).unwrap();
//! println!("Links per request: {}", config.pipeline.max_links);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExtractionConfig, IdentificationConfig, PipelineConfig, RuleEntry, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, resolve_api_key,
};
