//! Shared fixtures

use price_scout::config::{ExtractionConfig, UserAgentConfig};
use price_scout::links::build_resolver_client;
use price_scout::url::{PageClassifier, UrlValidator};
use price_scout::{ExtractionClient, LinkPreparer, RedirectResolver};
use reqwest::Client;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";

/// A client that never follows redirects, like the production one
pub fn resolver_client() -> Client {
    build_resolver_client(&UserAgentConfig::default(), Duration::from_secs(5))
        .expect("Failed to build resolver client")
}

pub fn resolver(max_hops: u32) -> RedirectResolver {
    RedirectResolver::with_client(resolver_client(), max_hops)
}

pub fn preparer(max_links: usize) -> LinkPreparer {
    LinkPreparer::new(
        resolver(2),
        UrlValidator::default(),
        PageClassifier::default(),
        max_links,
    )
}

/// Extraction settings pointed at a mock server, with short poll timings
pub fn extraction_config(server: &MockServer) -> ExtractionConfig {
    ExtractionConfig {
        api_url: format!("{}/v1/extract", server.uri()),
        max_concurrent_jobs: 3,
        request_timeout_secs: 5,
        initial_poll_delay_ms: 20,
        poll_interval_ms: 50,
        max_poll_attempts: 5,
        cache_max_age_ms: None,
        ..Default::default()
    }
}

pub fn extraction_client(config: ExtractionConfig) -> ExtractionClient {
    ExtractionClient::new(config, API_KEY, &UserAgentConfig::default())
        .expect("Failed to build extraction client")
}

/// Mounts a `HEAD` redirect from `from` to `to`
pub async fn mount_redirect(server: &MockServer, from: &str, to: &str) {
    Mock::given(method("HEAD"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(302).insert_header("location", to))
        .mount(server)
        .await;
}

/// Mounts a plain `200` for `HEAD` on `at`
pub async fn mount_page(server: &MockServer, at: &str) {
    Mock::given(method("HEAD"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}
