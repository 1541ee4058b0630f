use serde::Deserialize;

/// Main configuration structure for Price-Scout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub identification: IdentificationConfig,
    #[serde(rename = "classifier-rule", default)]
    pub classifier_rules: Vec<RuleEntry>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the client
    #[serde(rename = "client-name")]
    pub client_name: String,

    /// Version of the client
    #[serde(rename = "client-version")]
    pub client_version: String,

    /// URL with information about the client
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            client_name: "PriceScout".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/price-scout".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.client_name, self.client_version, self.contact_url
        )
    }
}

/// Link preparation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of raw links considered per request
    #[serde(rename = "max-links")]
    pub max_links: usize,

    /// Maximum number of HEAD probes per link
    #[serde(rename = "max-redirect-hops")]
    pub max_redirect_hops: u32,

    /// Timeout for each redirect probe (seconds)
    #[serde(rename = "resolve-timeout-secs")]
    pub resolve_timeout_secs: u64,

    /// Domain patterns whose pages are never extracted
    #[serde(rename = "blocked-domains")]
    pub blocked_domains: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_links: 6,
            max_redirect_hops: 2,
            resolve_timeout_secs: 10,
            blocked_domains: Vec::new(),
        }
    }
}

/// Extraction provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Submission endpoint; job status lives at `{api_url}/{id}`
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Environment variable holding the provider API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Size of the shared concurrency gate
    #[serde(rename = "max-concurrent-jobs")]
    pub max_concurrent_jobs: usize,

    /// Timeout for each submit or poll request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Delay before the first poll (milliseconds)
    #[serde(rename = "initial-poll-delay-ms")]
    pub initial_poll_delay_ms: u64,

    /// Delay between polls while the job is processing (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Maximum number of status fetches for one job
    #[serde(rename = "max-poll-attempts")]
    pub max_poll_attempts: u32,

    /// Provider-side cache age forwarded as `scrapeOptions.maxAge`
    #[serde(rename = "cache-max-age-ms")]
    pub cache_max_age_ms: Option<u64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.firecrawl.dev/v1/extract".to_string(),
            api_key_env: "FIRECRAWL_API_KEY".to_string(),
            max_concurrent_jobs: 3,
            request_timeout_secs: 60,
            initial_poll_delay_ms: 5_000,
            poll_interval_ms: 3_000,
            max_poll_attempts: 100,
            cache_max_age_ms: Some(604_800_000),
        }
    }
}

/// Product identification / link discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentificationConfig {
    /// Base URL of the Generative Language API
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum number of search terms sent to discovery
    #[serde(rename = "max-search-terms")]
    pub max_search_terms: usize,

    /// Timeout for each model request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.2,
            max_search_terms: 3,
            request_timeout_secs: 60,
        }
    }
}

/// Extra page classifier rule
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    /// Domain pattern (e.g., "shop.com" or "*.shop.com"); all domains when absent
    #[serde(default)]
    pub domain: Option<String>,

    /// Pattern spec, e.g. "segment:shop-all" or "query:searchTerm"
    pub pattern: String,

    /// One of "search", "collection", "product"
    pub verdict: String,
}
