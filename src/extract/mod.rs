//! Structured price extraction
//!
//! Wraps the external page-extraction service: request and result types,
//! normalization of the provider's loosely shaped responses, and the job
//! client with its concurrency gate and bounded poll loop.

mod client;
mod response;
mod types;

pub use client::{build_extraction_client, ExtractionClient};
pub use response::{PollStep, ProviderResponse, Submission};
pub use types::{
    extraction_schema, EcommerceLink, ExtractRequest, ExtractionResult, FailureKind, ScrapeOptions,
    EXTRACTION_PROMPT,
};
