//! Product identification and candidate link discovery
//!
//! The pipeline consumes two upstream collaborators: something that turns
//! product photos into a description, and something that turns a
//! description into candidate shopping links. Both sit behind traits so
//! the orchestrator can be driven by the Gemini client in production and
//! by fixed fakes in tests.

mod gemini;
mod search_terms;

pub use gemini::GeminiClient;
pub use search_terms::{extract_markdown_links, extract_search_terms};

use crate::{Result, ScoutError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// Identifies the product shown in one or more photos
#[async_trait]
pub trait ProductIdentifier: Send + Sync {
    /// Returns a free-text description ending with suggested search terms
    async fn identify(&self, images: &[ImageInput]) -> Result<String>;
}

/// Finds candidate shopping links for a product description
#[async_trait]
pub trait LinkDiscoverer: Send + Sync {
    /// Returns candidate links, unique and in discovery order
    async fn discover(&self, description: &str) -> Result<Vec<String>>;
}

/// An image ready to send inline to a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    /// Base64 (standard alphabet) encoded bytes
    pub data: String,
}

impl ImageInput {
    /// Encodes raw image bytes
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Reads an image file, inferring its type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let invalid = |reason: &str| ScoutError::InvalidImage {
            path: path.display().to_string(),
            reason: reason.to_string(),
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| invalid("file has no extension"))?;

        let mime_type = mime_for_extension(&extension)
            .ok_or_else(|| invalid("unsupported image type (expected jpeg, png, webp, or gif)"))?;

        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(invalid("file is empty"));
        }

        Ok(Self::from_bytes(&bytes, mime_type))
    }
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
