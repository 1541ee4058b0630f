//! Extraction job client
//!
//! Submits a batch of product URLs to the page-extraction service and
//! waits for the structured result. The service answers either with the
//! result inline or with a job id; in the second case the job status is
//! polled on a fixed interval until it completes, fails, or runs out of
//! attempts.
//!
//! Every failure comes back as an [`ExtractionResult::Failed`] value;
//! nothing here returns `Err` to the caller.

use crate::config::{resolve_api_key, Config, ExtractionConfig, UserAgentConfig};
use crate::context::RequestContext;
use crate::extract::response::{PollStep, ProviderResponse, Submission};
use crate::extract::types::{ExtractRequest, ExtractionResult, FailureKind};
use crate::ScoutError;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::Instrument;
use url::Url;

/// Builds the HTTP client used for extraction calls
pub fn build_extraction_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the page-extraction service
///
/// Clones share one concurrency gate, so the job limit holds across every
/// clone of a client, not per clone.
#[derive(Debug, Clone)]
pub struct ExtractionClient {
    http: Client,
    config: Arc<ExtractionConfig>,
    api_key: Arc<str>,
    gate: Arc<Semaphore>,
}

impl ExtractionClient {
    /// Creates a client with an explicit API key
    pub fn new(
        config: ExtractionConfig,
        api_key: impl Into<String>,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, ScoutError> {
        let http =
            build_extraction_client(user_agent, Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_client(http, config, api_key))
    }

    /// Creates a client, reading the API key from the configured variable
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let api_key = resolve_api_key(&config.extraction.api_key_env)?;
        Self::new(config.extraction.clone(), api_key, &config.user_agent)
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(http: Client, config: ExtractionConfig, api_key: impl Into<String>) -> Self {
        let permits = config.max_concurrent_jobs.max(1);
        let api_key: String = api_key.into();
        Self {
            http,
            config: Arc::new(config),
            api_key: Arc::from(api_key),
            gate: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Jobs that could start right now without waiting
    pub fn available_slots(&self) -> usize {
        self.gate.available_permits()
    }

    /// Extracts price listings from the given product URLs
    ///
    /// # Request Flow
    ///
    /// 1. An empty list fails immediately without a network call
    /// 2. Wait for a free job slot
    /// 3. Submit the URLs with the fixed prompt and schema
    /// 4. If the answer is a job id, wait the initial delay, then poll
    ///    until the job completes, fails, or the attempt budget runs out
    ///
    /// The slot is held until the job is finished, including the whole
    /// poll loop.
    pub async fn extract(&self, links: &[String], ctx: &RequestContext) -> ExtractionResult {
        self.run(links).instrument(ctx.span()).await
    }

    async fn run(&self, links: &[String]) -> ExtractionResult {
        if links.is_empty() {
            tracing::warn!("No valid product URLs, skipping extraction");
            return ExtractionResult::failure(
                FailureKind::NoValidUrls,
                "No valid product URLs to extract from",
            );
        }

        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return ExtractionResult::failure(
                    FailureKind::Network,
                    "Extraction client is shutting down",
                )
            }
        };

        let result = self.submit(links).await;

        match &result {
            ExtractionResult::Completed(_) => {
                tracing::info!(listings = result.listings().len(), "Extraction completed")
            }
            ExtractionResult::Failed { kind, error } => {
                tracing::warn!(%kind, %error, "Extraction failed")
            }
        }

        result
    }

    async fn submit(&self, links: &[String]) -> ExtractionResult {
        tracing::info!(
            urls = links.len(),
            endpoint = %self.config.api_url,
            "Submitting extraction job"
        );

        let body = ExtractRequest::new(links, self.config.cache_max_age_ms);
        let sent = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&*self.api_key)
            .json(&body)
            .send()
            .await;

        let response = match read_response(sent).await {
            Ok(response) => response,
            Err(failure) => return failure,
        };

        match response.submission() {
            Submission::Completed => ExtractionResult::Completed(response.raw),
            Submission::Job(id) => {
                tracing::info!(job_id = %id, "Extraction job accepted, polling for result");
                self.poll(&id).await
            }
            Submission::Rejected(error) => ExtractionResult::failure(FailureKind::Rejected, error),
            Submission::Unexpected(error) => {
                tracing::debug!(body = %response.raw, "Unrecognized extraction response");
                ExtractionResult::failure(FailureKind::UnexpectedShape, error)
            }
        }
    }

    async fn poll(&self, job_id: &str) -> ExtractionResult {
        let status_url = match job_status_url(&self.config.api_url, job_id) {
            Some(url) => url,
            None => {
                return ExtractionResult::failure(
                    FailureKind::UnexpectedShape,
                    format!("Cannot build a status URL for job '{}'", job_id),
                )
            }
        };
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let max_attempts = self.config.max_poll_attempts.max(1);

        sleep(Duration::from_millis(self.config.initial_poll_delay_ms)).await;

        for attempt in 1..=max_attempts {
            let sent = self
                .http
                .get(status_url.clone())
                .bearer_auth(&*self.api_key)
                .send()
                .await;

            let response = match read_response(sent).await {
                Ok(response) => response,
                Err(failure) => return failure,
            };

            match response.poll_step() {
                PollStep::Completed => return ExtractionResult::Completed(response.raw),
                PollStep::Continue => {
                    tracing::debug!(
                        job_id,
                        attempt,
                        status = %response.status,
                        "Extraction job still running"
                    );
                    if attempt < max_attempts {
                        sleep(interval).await;
                    }
                }
                PollStep::Stop(error) => {
                    return ExtractionResult::failure(FailureKind::JobFailed, error)
                }
            }
        }

        ExtractionResult::failure(
            FailureKind::PollTimeout,
            format!(
                "Extraction job {} did not finish after {} status checks",
                job_id, max_attempts
            ),
        )
    }
}

/// Reads a response body as JSON whatever the HTTP status
///
/// The provider reports its own errors in the body, so a 4xx with a JSON
/// body is still a response worth looking at.
async fn read_response(
    sent: Result<Response, reqwest::Error>,
) -> Result<ProviderResponse, ExtractionResult> {
    let response = sent.map_err(network_failure)?;
    let status = response.status();
    let body = response.text().await.map_err(network_failure)?;

    ProviderResponse::parse(&body).map_err(|e| {
        tracing::debug!(status = status.as_u16(), error = %e, "Extraction response is not JSON");
        ExtractionResult::failure(
            FailureKind::InvalidResponse,
            format!(
                "Extraction service returned invalid JSON (HTTP {})",
                status.as_u16()
            ),
        )
    })
}

/// Status endpoint for a job: the id becomes one escaped path segment
fn job_status_url(api_url: &str, job_id: &str) -> Option<Url> {
    let mut url = Url::parse(api_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(job_id);
    Some(url)
}

fn network_failure(e: reqwest::Error) -> ExtractionResult {
    let error = if e.is_timeout() {
        format!("Extraction request timed out: {}", e)
    } else {
        format!("Extraction request failed: {}", e)
    };
    ExtractionResult::failure(FailureKind::Network, error)
}
