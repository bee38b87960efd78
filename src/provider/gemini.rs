//! Google Gemini Content Provider
//!
//! Calls the Gemini `generateContent` endpoint for blessing text, card
//! illustrations and figure images. Images come back as inline base64 parts
//! and are returned as `data:` URIs.

use async_trait::async_trait;
use blessing_types::{CardStyle, ImageRef, ProviderConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use super::prompts::{self, CARD_ASPECT_RATIO, FIGURE_ASPECT_RATIO};
use super::ContentProvider;
use crate::error::ProviderError;

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    config: ProviderConfig,
    client: Client,
}

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

/// Gemini content structure
#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

/// Gemini content part
#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

/// Gemini generation configuration
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<GeminiImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    aspect_ratio: &'static str,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

/// Gemini candidate response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Gemini response content
#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

/// Gemini response part: text or inline binary data
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

/// Gemini usage metadata
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(prompt: String, config: GeminiGenerationConfig) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: Some(config),
        }
    }

    /// Send request to Gemini API
    async fn send_request(
        &self,
        model: &str,
        request_body: &GeminiRequest,
    ) -> Result<GeminiResponse, ProviderError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        debug!(
            "Sending request to Gemini API: {}",
            url.replace(&self.config.api_key, "***")
        );

        let response = self.client.post(&url).json(request_body).send().await?;

        let status = response.status();
        let response_text = response.text().await?;

        debug!("Gemini API response status: {}", status);

        if !status.is_success() {
            error!("Gemini API error: {} - {}", status, response_text);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        parse_response(&response_text)
    }

    async fn generate_inline_image(
        &self,
        prompt: String,
        aspect_ratio: &'static str,
    ) -> Result<ImageRef, ProviderError> {
        let request = Self::build_request(
            prompt,
            GeminiGenerationConfig {
                image_config: Some(GeminiImageConfig { aspect_ratio }),
                ..Default::default()
            },
        );
        let response = self.send_request(&self.config.image_model, &request).await?;
        let image = first_inline_image(&response);
        if image.is_empty() {
            debug!("Gemini returned no inline image part");
        }
        Ok(image)
    }
}

fn parse_response(raw: &str) -> Result<GeminiResponse, ProviderError> {
    let response: GeminiResponse = serde_json::from_str(raw).map_err(|e| {
        error!("Failed to parse Gemini response: {}", e);
        ProviderError::Json(e)
    })?;

    if response.candidates.is_empty() {
        return Err(ProviderError::invalid_response("No candidates in response"));
    }

    if let Some(usage) = &response.usage_metadata {
        info!(
            "Gemini API usage - Prompt: {:?} tokens, Response: {:?} tokens, Total: {:?} tokens",
            usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
        );
    }

    Ok(response)
}

fn first_candidate_parts(response: &GeminiResponse) -> &[GeminiResponsePart] {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .unwrap_or_default()
}

/// Concatenated text of the first candidate, trimmed
fn candidate_text(response: &GeminiResponse) -> String {
    let text: String = first_candidate_parts(response)
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    text.trim().to_string()
}

/// First inline image of the first candidate as a data URI, or empty
fn first_inline_image(response: &GeminiResponse) -> ImageRef {
    first_candidate_parts(response)
        .iter()
        .find_map(|p| p.inline_data.as_ref())
        .map(|d| ImageRef::inline(&d.mime_type, &d.data))
        .unwrap_or_default()
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    async fn generate_text(&self, recipient: &str, theme: &str) -> Result<String, ProviderError> {
        let request = Self::build_request(
            prompts::blessing_text_prompt(recipient, theme),
            GeminiGenerationConfig {
                temperature: self.config.text_temperature,
                ..Default::default()
            },
        );
        let response = self.send_request(&self.config.text_model, &request).await?;
        if let Some(reason) = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!("Gemini text finish reason: {}", reason);
        }
        Ok(candidate_text(&response))
    }

    async fn generate_image(
        &self,
        theme: &str,
        style: CardStyle,
    ) -> Result<ImageRef, ProviderError> {
        self.generate_inline_image(prompts::card_image_prompt(theme, style), CARD_ASPECT_RATIO)
            .await
    }

    async fn generate_figure_image(
        &self,
        theme: &str,
        recipient: &str,
        style: CardStyle,
    ) -> Result<ImageRef, ProviderError> {
        self.generate_inline_image(
            prompts::figure_image_prompt(theme, recipient, style),
            FIGURE_ASPECT_RATIO,
        )
        .await
    }

    fn provider_name(&self) -> &str {
        "Gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> ProviderConfig {
        ProviderConfig::new("test-key")
    }

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new(create_test_config());
        assert!(provider.is_ok());
    }

    #[test]
    fn test_gemini_provider_empty_api_key() {
        let provider = GeminiProvider::new(ProviderConfig::default());
        assert!(matches!(provider.err(), Some(ProviderError::MissingApiKey)));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GeminiProvider::build_request(
            "hello".to_string(),
            GeminiGenerationConfig {
                image_config: Some(GeminiImageConfig {
                    aspect_ratio: CARD_ASPECT_RATIO,
                }),
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");
        assert!(json["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_parse_text_response() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "따뜻한 "}, {"text": "말\n"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "totalTokenCount": 20}
        }"#;
        let response = parse_response(raw).unwrap();
        assert_eq!(candidate_text(&response), "따뜻한 말");
    }

    #[test]
    fn test_parse_inline_image() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here is your image"},
                    {"inlineData": {"mimeType": "image/png", "data": "AAA"}}
                ]}
            }]
        }"#;
        let response = parse_response(raw).unwrap();
        assert_eq!(
            first_inline_image(&response).as_str(),
            "data:image/png;base64,AAA"
        );
    }

    #[test]
    fn test_missing_image_part_is_empty() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "sorry"}]}}]}"#;
        let response = parse_response(raw).unwrap();
        assert!(first_inline_image(&response).is_empty());
    }

    #[test]
    fn test_candidate_without_content() {
        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response = parse_response(raw).unwrap();
        assert_eq!(candidate_text(&response), "");
        assert!(first_inline_image(&response).is_empty());
    }

    #[test]
    fn test_no_candidates_is_error() {
        let err = parse_response(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = parse_response("not json").unwrap_err();
        assert!(matches!(err, ProviderError::Json(_)));
    }

    // Integration test - requires API key
    #[tokio::test]
    #[ignore = "Requires GEMINI_API_KEY environment variable"]
    async fn test_gemini_integration() {
        let key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        if key.is_empty() {
            panic!("GEMINI_API_KEY environment variable required for integration test");
        }

        let provider = GeminiProvider::new(ProviderConfig::new(key)).unwrap();
        let text = provider.generate_text("지은", "새로운 시작").await.unwrap();
        println!("Generated text: {}", text);
        assert!(!text.is_empty());
    }
}
