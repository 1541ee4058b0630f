//! Gemini client for identification and discovery
//!
//! Talks to the Generative Language REST API with the Google Search tool
//! enabled. Identification sends the photos inline and returns the model's
//! text. Discovery asks for purchase pages per search term and reads the
//! links from the grounding metadata rather than from the text.

use super::search_terms::{extract_markdown_links, extract_search_terms};
use super::{ImageInput, LinkDiscoverer, ProductIdentifier};
use crate::config::{resolve_api_key, Config, IdentificationConfig, UserAgentConfig};
use crate::{Result, ScoutError};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

const SYSTEM_INSTRUCTION: &str = "You are a product identification assistant that recognizes \
products in images and describes them in detail. Identify the exact brand, make, model, and key \
specifications so the specific item can be found and bought online. Always end with a clearly \
marked list of typical search terms, quoted or bullet-listed.";

const IDENTIFY_PROMPT: &str = "Identify this product with maximum specific detail. Provide brand, \
make, model, full product name, and key technical specifications. At the end, clearly list \
typical search terms, inside double quotes if possible, or as bullet points if that's clearer.";

fn discovery_prompt(term: &str) -> String {
    format!(
        "Find direct product purchase pages for: {}\n\
         Use Google Search to locate specific product pages where customers can directly buy \
         this exact item. Include only direct product pages with purchase options, official \
         retailer or manufacturer pages, and e-commerce sites selling the specific product. \
         Exclude manuals and documentation, search results or category pages, review sites \
         without purchase links, and out-of-stock listings. Provide clean URLs only, one per line.",
        term
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(image: &ImageInput) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }

    /// Web URIs cited by the first candidate's search grounding
    fn grounding_uris(&self) -> Vec<String> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|meta| {
                meta.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .filter_map(|web| web.uri.clone())
                    .filter(|uri| !uri.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Client for the Generative Language API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: IdentificationConfig,
    api_key: String,
}

impl GeminiClient {
    /// Creates a client with an explicit API key
    pub fn new(
        config: IdentificationConfig,
        api_key: impl Into<String>,
        user_agent: &UserAgentConfig,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent.header_value())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(http, config, api_key))
    }

    /// Creates a client, reading the API key from the configured variable
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = resolve_api_key(&config.identification.api_key_env)?;
        Self::new(config.identification.clone(), api_key, &config.user_agent)
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(
        http: Client,
        config: IdentificationConfig,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            config,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<GenerateResponse> {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(SYSTEM_INSTRUCTION)],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_modalities: vec!["TEXT"],
            },
        };

        let url = self.endpoint();
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| ScoutError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Api {
                service: "Gemini".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn discover_term(&self, term: &str) -> Result<Vec<String>> {
        let response = self.generate(vec![Part::text(discovery_prompt(term))]).await?;

        let links = response.grounding_uris();
        if !links.is_empty() {
            return Ok(links);
        }

        Ok(extract_markdown_links(&response.text()))
    }
}

#[async_trait]
impl ProductIdentifier for GeminiClient {
    async fn identify(&self, images: &[ImageInput]) -> Result<String> {
        if images.is_empty() {
            return Err(ScoutError::Identification("no images provided".to_string()));
        }

        let mut parts = vec![Part::text(IDENTIFY_PROMPT)];
        parts.extend(images.iter().map(Part::image));

        tracing::info!(images = images.len(), model = %self.config.model, "Identifying product");

        let text = self.generate(parts).await?.text();
        if text.trim().is_empty() {
            return Err(ScoutError::Identification(
                "model returned no description".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl LinkDiscoverer for GeminiClient {
    /// Searches each suggested term (or the whole description when none)
    ///
    /// A failing term is skipped; discovery fails only when every term
    /// failed.
    async fn discover(&self, description: &str) -> Result<Vec<String>> {
        let mut terms = extract_search_terms(description);
        if terms.is_empty() {
            terms.push(description.trim().to_string());
        }
        terms.truncate(self.config.max_search_terms.max(1));

        tracing::info!(terms = terms.len(), "Discovering shopping links");

        let results = join_all(terms.iter().map(|term| self.discover_term(term))).await;

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        let mut failures = 0;

        for (term, result) in terms.iter().zip(results) {
            match result {
                Ok(found) => {
                    tracing::debug!(term = %term, found = found.len(), "Term searched");
                    links.extend(found.into_iter().filter(|link| seen.insert(link.clone())));
                }
                Err(e) => {
                    tracing::warn!(term = %term, error = %e, "Link discovery failed for term");
                    failures += 1;
                }
            }
        }

        if failures == terms.len() {
            return Err(ScoutError::Discovery(format!(
                "all {} search requests failed",
                failures
            )));
        }

        Ok(links)
    }
}
