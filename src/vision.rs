//! Image generation through the Gemini `generateContent` API.
//!
//! The API key is looked up on every call, so a server started without
//! credentials still serves every other tool.

use crate::error::{DeckError, Result};
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: [&'static str; 2],
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: [RequestContent {
                parts: [TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["TEXT", "IMAGE"],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

fn require_key(value: Option<String>) -> Result<String> {
    value
        .filter(|key| !key.trim().is_empty())
        .ok_or(DeckError::MissingCredential(API_KEY_VAR))
}

/// Decoded bytes of the first inline image of the first candidate.
fn first_inline_image(response: GenerateResponse) -> Result<Vec<u8>> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    let mut text = Vec::new();
    for part in parts {
        if let Some(inline) = part.inline_data {
            debug!(
                "Received inline image ({})",
                inline.mime_type.as_deref().unwrap_or("unknown type")
            );
            return base64::engine::general_purpose::STANDARD
                .decode(inline.data.trim())
                .map_err(|e| DeckError::ImageGeneration(format!("invalid image payload: {}", e)));
        }
        text.extend(part.text);
    }

    let detail = if text.is_empty() {
        "response contained no image".to_string()
    } else {
        format!("response contained no image: {}", text.join(" "))
    };
    Err(DeckError::ImageGeneration(detail))
}

/// Decode `bytes` and write them to `destination` in the format its
/// extension names, creating parent folders as needed.
fn save_image(bytes: &[u8], destination: &Path) -> Result<()> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| DeckError::ImageGeneration(format!("returned data is not an image: {}", e)))?;
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DeckError::io(parent, e))?;
    }
    image.save(destination).map_err(|e| {
        DeckError::ImageGeneration(format!("could not save to {}: {}", destination.display(), e))
    })
}

/// Client for one image model.
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    http: Client,
    endpoint: String,
    model: String,
}

impl ImageGenerator {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Ask the model for an image and return its encoded bytes.
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let api_key = require_key(std::env::var(API_KEY_VAR).ok())?;

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&GenerateRequest::new(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeckError::ImageGeneration(format!("{}: {}", status, body.trim())));
        }

        first_inline_image(response.json().await?)
    }

    /// Generate an image for `prompt` and save it at `destination`.
    pub async fn generate_and_save(&self, prompt: &str, destination: &Path) -> Result<PathBuf> {
        let bytes = self.generate(prompt).await?;
        let destination = destination.to_path_buf();
        let saved = tokio::task::spawn_blocking(move || {
            save_image(&bytes, &destination).map(|()| destination)
        })
        .await
        .map_err(|e| DeckError::ImageGeneration(e.to_string()))??;
        info!("Saved generated image to {}", saved.display());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use serde_json::json;
    use std::io::Cursor;

    fn png() -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(3, 2))
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn response(value: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_key() {
        let err = require_key(None).unwrap_err();
        assert_eq!(err.to_string(), "GEMINI_API_KEY environment variable not set.");
        assert!(require_key(Some(" ".into())).is_err());
        assert_eq!(require_key(Some("k".into())).unwrap(), "k");
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(GenerateRequest::new("a red fox")).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{"parts": [{"text": "a red fox"}]}],
                "generationConfig": {"responseModalities": ["TEXT", "IMAGE"]}
            })
        );
    }

    #[test]
    fn test_first_inline_image() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png());
        let bytes = first_inline_image(response(json!({
            "candidates": [{"content": {"parts": [
                {"text": "Here is your fox"},
                {"inlineData": {"mimeType": "image/png", "data": encoded}}
            ]}}]
        })))
        .unwrap();
        assert_eq!(bytes, png());
    }

    #[test]
    fn test_text_only_response() {
        let err = first_inline_image(response(json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that"}]}}]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("I cannot draw that"));
        assert!(first_inline_image(response(json!({}))).is_err());
    }

    #[test]
    fn test_save_image_creates_folders() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/fox.png");
        save_image(&png(), &target).unwrap();
        assert_eq!(image::image_dimensions(&target).unwrap(), (3, 2));

        let err = save_image(b"garbage", &dir.path().join("x.png")).unwrap_err();
        assert!(matches!(err, DeckError::ImageGeneration(_)));
    }

    #[test]
    fn test_url() {
        let generator = ImageGenerator::new("https://example.test/v1beta/", DEFAULT_MODEL, Duration::from_secs(5)).unwrap();
        assert_eq!(
            generator.url(),
            "https://example.test/v1beta/models/gemini-2.0-flash-preview-image-generation:generateContent"
        );
    }
}
