//! Redirect resolver
//!
//! Candidate links from search grounding are usually click-tracking
//! wrappers. This module turns them into their destinations with a short,
//! bounded chain of `HEAD` probes:
//! - redirects are never followed automatically by the client
//! - each probe has its own timeout
//! - relative `Location` values resolve against the URL that sent them
//! - any failure yields the original URL unchanged

use crate::config::{PipelineConfig, UserAgentConfig};
use crate::{ScoutError, UrlError};
use reqwest::header::LOCATION;
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used for redirect probes
///
/// Redirects are handled manually so every hop is observed and bounded.
pub fn build_resolver_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Resolves redirect wrappers to their destination URLs
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    client: Client,
    max_hops: u32,
}

impl RedirectResolver {
    /// Creates a resolver from pipeline and user agent configuration
    pub fn new(config: &PipelineConfig, user_agent: &UserAgentConfig) -> Result<Self, ScoutError> {
        let client =
            build_resolver_client(user_agent, Duration::from_secs(config.resolve_timeout_secs))?;
        Ok(Self::with_client(client, config.max_redirect_hops))
    }

    /// Creates a resolver around an existing client
    ///
    /// The client must not follow redirects on its own.
    pub fn with_client(client: Client, max_hops: u32) -> Self {
        Self {
            client,
            max_hops: max_hops.max(1),
        }
    }

    /// Resolves a URL to the last `Location` discovered within the hop budget
    ///
    /// # Request Flow
    ///
    /// 1. `HEAD` the URL without following redirects
    /// 2. On a 3xx with a `Location`, probe that location the same way,
    ///    up to `max_hops` probes in total
    /// 3. On a non-redirect response, return its `Location` if it sent
    ///    one, otherwise the URL that was probed
    ///
    /// A chain longer than the hop budget resolves to the `Location` of the
    /// last probe; that location itself is never requested.
    ///
    /// Never fails: network errors, timeouts, and unusable `Location`
    /// values all return `url` unchanged.
    pub async fn resolve(&self, url: &str) -> String {
        match self.follow(url).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!(url, error = %e, "Redirect resolution failed, keeping original");
                url.to_string()
            }
        }
    }

    async fn follow(&self, url: &str) -> Result<String, ScoutError> {
        let mut current = url.to_string();

        for hop in 1..=self.max_hops {
            let response = self
                .client
                .head(&current)
                .send()
                .await
                .map_err(|source| ScoutError::Http {
                    url: current.clone(),
                    source,
                })?;

            let status = response.status();
            let location = location_of(&response, &current)?;

            tracing::trace!(
                hop,
                url = %current,
                status = status.as_u16(),
                ?location,
                "Redirect probe"
            );

            if status.is_redirection() {
                match location {
                    Some(next) => current = next,
                    None => return Ok(current),
                }
            } else {
                return Ok(location.unwrap_or(current));
            }
        }

        Ok(current)
    }
}

/// Reads the `Location` header, resolved against the URL that sent it
fn location_of(response: &Response, base: &str) -> Result<Option<String>, UrlError> {
    let value = match response.headers().get(LOCATION) {
        Some(value) => value,
        None => return Ok(None),
    };

    let raw = value
        .to_str()
        .map_err(|e| UrlError::Malformed(format!("Location header is not text: {}", e)))?
        .trim();

    if raw.is_empty() {
        return Ok(None);
    }

    let base = Url::parse(base).map_err(|e| UrlError::Parse(e.to_string()))?;
    let next = base
        .join(raw)
        .map_err(|e| UrlError::Malformed(format!("Bad Location '{}': {}", raw, e)))?;

    Ok(Some(next.to_string()))
}
