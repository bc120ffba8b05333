mod gemini;

pub use gemini::{GeminiClient, GeminiConfig, GEMINI_API_BASE};

use crate::error::Result;
use crate::scene::{GeneratedImage, ReferenceImage};
use async_trait::async_trait;
use serde_json::Value;

/// Request for a schema-constrained structured payload.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    pub image: &'a ReferenceImage,
    pub system_instruction: &'a str,
    pub prompt: &'a str,
    pub response_schema: &'a Value,
}

/// Request for image synthesis anchored on the reference photo.
#[derive(Debug, Clone, Copy)]
pub struct ImageRequest<'a> {
    pub image: &'a ReferenceImage,
    pub prompt: &'a str,
    pub aspect_ratio: &'a str,
}

/// The external generative content service.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Returns the raw structured text. Shape validation is the caller's job.
    async fn generate_structured(&self, request: &StructuredRequest<'_>) -> Result<String>;

    /// Returns every image payload in the response, possibly none.
    async fn generate_images(&self, request: &ImageRequest<'_>) -> Result<Vec<GeneratedImage>>;
}
