//! Per-request correlation
//!
//! A `RequestContext` carries nothing but a short identifier that ties
//! together every log line one request produces.

use std::fmt;
use tracing::Span;

/// Length of the generated identifier
const ID_LEN: usize = 8;

/// Opaque correlation token for one inbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    id: String,
}

impl RequestContext {
    /// Generates a fresh short identifier
    pub fn new() -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: uuid[..ID_LEN].to_string(),
        }
    }

    /// Wraps an identifier supplied by the caller
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Span that tags every event inside it with the request id
    pub fn span(&self) -> Span {
        tracing::info_span!("request", request_id = %self.id)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
