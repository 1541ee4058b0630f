use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

/// Instruction sent with every extraction request
pub const EXTRACTION_PROMPT: &str = "Extract the main price and the direct product page URL \
from each specified product page, one entry per URL. Take the main listed price even if the \
product is out of stock. Include the website name, the price exactly as displayed \
(price_combined), the bare numeric price (price_string), and the ISO 4217 currency code \
(currency_code).";

/// JSON schema the provider must conform to
pub fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ecommerce_links": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "website_name": { "type": "string" },
                        "price_combined": { "type": "string" },
                        "price_string": { "type": "string" },
                        "currency_code": { "type": "string" },
                        "website_url": { "type": "string" }
                    },
                    "required": [
                        "website_name",
                        "price_combined",
                        "price_string",
                        "currency_code",
                        "website_url"
                    ]
                }
            }
        },
        "required": ["ecommerce_links"]
    })
}

/// Body of an extraction submission
#[derive(Debug, Clone, Serialize)]
pub struct ExtractRequest<'a> {
    pub urls: &'a [String],
    pub prompt: &'a str,
    pub schema: Value,
    #[serde(rename = "scrapeOptions", skip_serializing_if = "Option::is_none")]
    pub scrape_options: Option<ScrapeOptions>,
}

impl<'a> ExtractRequest<'a> {
    pub fn new(urls: &'a [String], cache_max_age_ms: Option<u64>) -> Self {
        Self {
            urls,
            prompt: EXTRACTION_PROMPT,
            schema: extraction_schema(),
            scrape_options: cache_max_age_ms.map(|max_age| ScrapeOptions { max_age }),
        }
    }
}

/// Provider-side scraping options
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScrapeOptions {
    #[serde(rename = "maxAge")]
    pub max_age: u64,
}

/// One extracted listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcommerceLink {
    pub website_name: String,
    pub price_combined: String,
    #[serde(alias = "price")]
    pub price_string: String,
    pub currency_code: String,
    pub website_url: String,
}

/// Why an extraction produced no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Nothing survived link preparation; the provider was never called
    NoValidUrls,
    /// Connection failure or timeout talking to the provider
    Network,
    /// The provider answered with something other than JSON
    InvalidResponse,
    /// JSON without a payload, a completed status, or a job id
    UnexpectedShape,
    /// The provider refused the submission
    Rejected,
    /// The job ended in a non-success status
    JobFailed,
    /// The job was still running when the poll budget ran out
    PollTimeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoValidUrls => "no_valid_urls",
            Self::Network => "network",
            Self::InvalidResponse => "invalid_response",
            Self::UnexpectedShape => "unexpected_shape",
            Self::Rejected => "rejected",
            Self::JobFailed => "job_failed",
            Self::PollTimeout => "poll_timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one extraction call
///
/// Serializes to the provider payload on success and to
/// `{"success": false, "error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// The provider's accepted payload, verbatim
    Completed(Value),
    /// No payload; `error` is human-readable
    Failed { kind: FailureKind, error: String },
}

impl ExtractionResult {
    pub fn failure(kind: FailureKind, error: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { kind, .. } => Some(*kind),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Completed(payload) => Some(payload),
            Self::Failed { .. } => None,
        }
    }

    /// Typed view of `data.ecommerce_links`; malformed entries are skipped
    pub fn listings(&self) -> Vec<EcommerceLink> {
        self.payload()
            .and_then(|payload| payload.get("data"))
            .and_then(|data| data.get("ecommerce_links"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The caller-facing JSON shape
    pub fn to_value(&self) -> Value {
        match self {
            Self::Completed(payload) => payload.clone(),
            Self::Failed { error, .. } => json!({ "success": false, "error": error }),
        }
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
