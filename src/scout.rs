//! Request orchestration
//!
//! `ProductScout` wires the stages together for one request:
//! photos → description → candidate links → product links → listings.
//! Every entry point runs inside a request span so the log lines of
//! concurrent requests can be told apart.

use crate::context::RequestContext;
use crate::discovery::{GeminiClient, ImageInput, LinkDiscoverer, ProductIdentifier};
use crate::extract::{ExtractionClient, ExtractionResult};
use crate::links::{LinkOutcome, LinkPreparer, PreparationStats};
use crate::{Config, Result, ScoutError};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

/// Everything one request produced
#[derive(Debug, Clone, Serialize)]
pub struct ScoutReport {
    pub request_id: String,
    /// Model description of the product (image requests only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    /// Candidate links as discovered
    pub shopping_links: Vec<String>,
    /// Links that survived preparation, in discovery order
    pub product_links: Vec<String>,
    /// What preparation decided for each considered link
    pub outcomes: Vec<LinkOutcome>,
    pub stats: PreparationStats,
    /// Absent when extraction was not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
}

/// Runs the price discovery pipeline
#[derive(Clone)]
pub struct ProductScout {
    preparer: LinkPreparer,
    identifier: Option<Arc<dyn ProductIdentifier>>,
    discoverer: Option<Arc<dyn LinkDiscoverer>>,
    extractor: Option<ExtractionClient>,
}

impl ProductScout {
    /// Creates a scout that can only prepare links
    ///
    /// Add collaborators with the `with_*` methods.
    pub fn new(preparer: LinkPreparer) -> Self {
        Self {
            preparer,
            identifier: None,
            discoverer: None,
            extractor: None,
        }
    }

    /// Creates a fully wired scout, reading API keys from the environment
    pub fn from_config(config: &Config) -> Result<Self> {
        let gemini = Arc::new(GeminiClient::from_config(config)?);
        Ok(Self::new(LinkPreparer::from_config(config)?)
            .with_identifier(gemini.clone())
            .with_discoverer(gemini)
            .with_extractor(ExtractionClient::from_config(config)?))
    }

    pub fn with_identifier(mut self, identifier: Arc<dyn ProductIdentifier>) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn with_discoverer(mut self, discoverer: Arc<dyn LinkDiscoverer>) -> Self {
        self.discoverer = Some(discoverer);
        self
    }

    pub fn with_extractor(mut self, extractor: ExtractionClient) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Identifies the product in the photos, then searches for it
    pub async fn analyze_images(&self, images: &[ImageInput]) -> Result<ScoutReport> {
        let ctx = RequestContext::new();
        async {
            let identifier = self
                .identifier
                .as_ref()
                .ok_or_else(|| ScoutError::NotConfigured("product identification".to_string()))?;

            let description = identifier.identify(images).await?;
            tracing::info!(chars = description.len(), "Product identified");

            let mut report = self.discover_and_price(&ctx, &description).await?;
            report.product_description = Some(description);
            Ok::<_, ScoutError>(report)
        }
        .instrument(ctx.span())
        .await
    }

    /// Searches for a product described in text
    pub async fn search(&self, text: &str) -> Result<ScoutReport> {
        let ctx = RequestContext::new();
        self.discover_and_price(&ctx, text)
            .instrument(ctx.span())
            .await
    }

    /// Prices an explicit list of candidate links
    pub async fn price_links(&self, raw_links: &[String]) -> Result<ScoutReport> {
        let ctx = RequestContext::new();
        Ok(self
            .price(&ctx, raw_links.to_vec())
            .instrument(ctx.span())
            .await)
    }

    async fn discover_and_price(
        &self,
        ctx: &RequestContext,
        description: &str,
    ) -> Result<ScoutReport> {
        let discoverer = self
            .discoverer
            .as_ref()
            .ok_or_else(|| ScoutError::NotConfigured("link discovery".to_string()))?;

        let links = discoverer.discover(description).await?;
        tracing::info!(links = links.len(), "Candidate links discovered");

        Ok(self.price(ctx, links).await)
    }

    async fn price(&self, ctx: &RequestContext, shopping_links: Vec<String>) -> ScoutReport {
        let prepared = self.preparer.prepare_detailed(&shopping_links).await;

        let extraction = match &self.extractor {
            Some(extractor) => Some(extractor.extract(&prepared.links, ctx).await),
            None => {
                tracing::debug!("No extraction client, stopping after preparation");
                None
            }
        };

        ScoutReport {
            request_id: ctx.id().to_string(),
            product_description: None,
            shopping_links,
            product_links: prepared.links,
            outcomes: prepared.outcomes,
            stats: prepared.stats,
            extraction,
        }
    }
}
