use super::{GenerativeService, ImageRequest, StructuredRequest};
use crate::error::{Result, StudioError};
use crate::scene::{GeneratedImage, ReferenceImage};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    /// Model used for the structured blueprint
    pub text_model: String,
    /// Model used for per-scene stills
    pub image_model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: GEMINI_API_BASE.to_string(),
            text_model: "gemini-3-pro-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(default, rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(StudioError::Configuration(
                "Gemini API key is required".to_string(),
            ));
        }
        if config.text_model.trim().is_empty() || config.image_model.trim().is_empty() {
            return Err(StudioError::Configuration(
                "Gemini model names are required".to_string(),
            ));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model.trim()
        )
    }

    async fn generate_content(&self, model: &str, payload: &Value) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.config.api_key.trim())
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(StudioError::Api(format!(
                "Gemini API error (HTTP {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            StudioError::invalid_response(format!("invalid Gemini response JSON: {}", e))
        })?;
        if let Some(tokens) = parsed
            .usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count)
        {
            debug!("{} used {} tokens", model, tokens);
        }
        Ok(parsed)
    }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    async fn generate_structured(&self, request: &StructuredRequest<'_>) -> Result<String> {
        info!("Requesting blueprint from {}...", self.config.text_model);
        let payload = structured_payload(request);
        let response = self
            .generate_content(&self.config.text_model, &payload)
            .await?;
        Ok(first_candidate_text(&response))
    }

    async fn generate_images(&self, request: &ImageRequest<'_>) -> Result<Vec<GeneratedImage>> {
        debug!("Requesting image from {}", self.config.image_model);
        let payload = image_payload(request);
        let response = self
            .generate_content(&self.config.image_model, &payload)
            .await?;
        first_candidate_images(&response)
    }
}

fn inline_image_part(image: &ReferenceImage) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type,
            "data": STANDARD.encode(&image.data),
        }
    })
}

fn structured_payload(request: &StructuredRequest<'_>) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }]
        },
        "contents": [{
            "role": "user",
            "parts": [
                inline_image_part(request.image),
                { "text": request.prompt },
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": request.response_schema,
        }
    })
}

fn image_payload(request: &ImageRequest<'_>) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                inline_image_part(request.image),
                { "text": request.prompt },
            ]
        }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"],
            "imageConfig": { "aspectRatio": request.aspect_ratio },
        }
    })
}

fn first_candidate_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
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

fn first_candidate_images(response: &GenerateContentResponse) -> Result<Vec<GeneratedImage>> {
    let Some(candidate) = response.candidates.first() else {
        return Ok(Vec::new());
    };
    if let Some(reason) = candidate.finish_reason.as_deref() {
        debug!("Image candidate finished with {}", reason);
    }
    let Some(content) = candidate.content.as_ref() else {
        return Ok(Vec::new());
    };
    content
        .parts
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .map(|inline| -> Result<GeneratedImage> {
            Ok(GeneratedImage {
                mime_type: inline.mime_type.clone(),
                data: STANDARD.decode(inline.data.as_bytes())?,
            })
        })
        .collect()
}
