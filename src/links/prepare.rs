//! Link preparation pipeline
//!
//! Turns the raw candidate links of one request into the ordered list of
//! probable product pages handed to extraction:
//! 1. drop exact duplicates, then cap the batch at `max_links`
//! 2. resolve every link in the batch concurrently
//! 3. drop links whose resolution changed nothing
//! 4. drop destinations that fail URL validation
//! 5. drop search and collection pages
//! 6. drop destinations already accepted under another URL
//!
//! Output order is input order regardless of which resolution finishes
//! first. An empty result is final; filters are never relaxed to refill it.

use crate::config::Config;
use crate::links::resolver::RedirectResolver;
use crate::state::LinkDisposition;
use crate::url::{canonical_key, PageClassifier, PageKind, RuleTable, UrlValidator};
use crate::ScoutError;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;

/// Per-link record of what preparation decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    /// The link as received
    pub original: String,
    /// Where resolution led (equal to `original` when nothing changed)
    pub resolved: String,
    pub disposition: LinkDisposition,
}

/// Counts for one preparation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreparationStats {
    /// Links received from discovery
    pub received: usize,
    /// Exact duplicates among the received links
    pub repeated_inputs: usize,
    /// Unique links cut by the batch cap
    pub truncated: usize,
    /// Links that were resolved and judged
    pub considered: usize,
    pub accepted: usize,
    pub unresolved: usize,
    pub invalid: usize,
    pub search_pages: usize,
    pub collection_pages: usize,
    pub duplicates: usize,
}

impl PreparationStats {
    fn record(&mut self, disposition: LinkDisposition) {
        let slot = match disposition {
            LinkDisposition::Accepted => &mut self.accepted,
            LinkDisposition::Unresolved => &mut self.unresolved,
            LinkDisposition::Invalid => &mut self.invalid,
            LinkDisposition::SearchPage => &mut self.search_pages,
            LinkDisposition::CollectionPage => &mut self.collection_pages,
            LinkDisposition::Duplicate => &mut self.duplicates,
        };
        *slot += 1;
    }

    /// Number of considered links that were dropped
    pub fn dropped(&self) -> usize {
        self.considered - self.accepted
    }
}

/// Full result of a preparation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreparedLinks {
    /// Accepted destinations, in input order
    pub links: Vec<String>,
    /// One outcome per considered link, in input order
    pub outcomes: Vec<LinkOutcome>,
    pub stats: PreparationStats,
}

impl PreparedLinks {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Orchestrates resolution, validation, and classification for a batch
#[derive(Debug, Clone)]
pub struct LinkPreparer {
    resolver: RedirectResolver,
    validator: UrlValidator,
    classifier: PageClassifier,
    max_links: usize,
}

impl LinkPreparer {
    /// Creates a preparer from its collaborators
    pub fn new(
        resolver: RedirectResolver,
        validator: UrlValidator,
        classifier: PageClassifier,
        max_links: usize,
    ) -> Self {
        Self {
            resolver,
            validator,
            classifier,
            max_links: max_links.max(1),
        }
    }

    /// Builds a preparer from configuration
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let resolver = RedirectResolver::new(&config.pipeline, &config.user_agent)?;
        let validator = UrlValidator::new(config.pipeline.blocked_domains.clone());
        let classifier = PageClassifier::new(RuleTable::with_configured(&config.classifier_rules)?);
        Ok(Self::new(
            resolver,
            validator,
            classifier,
            config.pipeline.max_links,
        ))
    }

    /// Returns the accepted product links for a batch of raw links
    pub async fn prepare(&self, raw_links: &[String]) -> Vec<String> {
        self.prepare_detailed(raw_links).await.links
    }

    /// Prepares a batch and reports what happened to every link
    ///
    /// Exact repeats are dropped first, so the cap counts unique links:
    /// with a repeat among the first `max_links` inputs, the next input is
    /// still considered.
    pub async fn prepare_detailed(&self, raw_links: &[String]) -> PreparedLinks {
        let mut stats = PreparationStats {
            received: raw_links.len(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        let unique: Vec<&str> = raw_links
            .iter()
            .map(String::as_str)
            .filter(|link| seen.insert(*link))
            .collect();
        stats.repeated_inputs = raw_links.len() - unique.len();

        let batch: Vec<&str> = unique.iter().copied().take(self.max_links).collect();
        stats.truncated = unique.len() - batch.len();
        stats.considered = batch.len();

        if stats.truncated > 0 {
            tracing::debug!(
                kept = batch.len(),
                cut = stats.truncated,
                "Candidate batch truncated"
            );
        }

        // join_all yields results in input order
        let resolved = join_all(batch.iter().map(|link| self.resolver.resolve(link))).await;

        let mut accepted_keys = HashSet::new();
        let mut links = Vec::new();
        let mut outcomes = Vec::with_capacity(batch.len());

        for (original, resolved) in batch.into_iter().zip(resolved) {
            let disposition = self.judge(original, &resolved, &mut accepted_keys);
            stats.record(disposition);

            if disposition.is_accepted() {
                links.push(resolved.clone());
            } else {
                tracing::debug!(
                    original,
                    resolved = %resolved,
                    reason = %disposition,
                    "Dropping candidate link"
                );
            }

            outcomes.push(LinkOutcome {
                original: original.to_string(),
                resolved,
                disposition,
            });
        }

        tracing::info!(
            received = stats.received,
            considered = stats.considered,
            accepted = stats.accepted,
            unresolved = stats.unresolved,
            invalid = stats.invalid,
            search_pages = stats.search_pages,
            collection_pages = stats.collection_pages,
            duplicates = stats.duplicates,
            "Link preparation finished"
        );

        PreparedLinks {
            links,
            outcomes,
            stats,
        }
    }

    fn judge(
        &self,
        original: &str,
        resolved: &str,
        accepted_keys: &mut HashSet<String>,
    ) -> LinkDisposition {
        if resolved == original {
            return LinkDisposition::Unresolved;
        }

        if !self.validator.is_valid(resolved) {
            return LinkDisposition::Invalid;
        }

        match self.classifier.should_discard(resolved) {
            Some(PageKind::Search) => return LinkDisposition::SearchPage,
            Some(_) => return LinkDisposition::CollectionPage,
            None => {}
        }

        let key = canonical_key(resolved).unwrap_or_else(|_| resolved.to_string());
        if !accepted_keys.insert(key) {
            return LinkDisposition::Duplicate;
        }

        LinkDisposition::Accepted
    }
}
