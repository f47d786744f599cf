//! Google Gemini provider implementation
//!
//! Calls the `generateContent` endpoint of the Generative Language API and
//! returns the text of the first candidate.

use crate::llm::provider::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, Message, MessageRole,
    TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

/// Gemini provider configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Gemini provider implementation
///
/// Construction succeeds without an API key so the server can start; every
/// call then fails with [`LlmError::NotConfigured`].
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn ensure_configured(&self) -> Result<(), LlmError> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::NotConfigured(
                "GEMINI_API_KEY environment variable not set".to_string(),
            ));
        }
        Ok(())
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Gemini has no system role here; every message becomes one content
    /// block in order (pure function)
    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        messages
            .iter()
            .map(|message| GeminiContent {
                role: match message.role {
                    MessageRole::Assistant => Some("model".to_string()),
                    MessageRole::User | MessageRole::System => None,
                },
                parts: vec![GeminiPart {
                    text: message.content.clone(),
                }],
            })
            .collect()
    }

    async fn post(&self, model: &str, body: &GeminiRequest) -> Result<GeminiResponse, LlmError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                LlmError::NetworkError(format!("failed to make API request: {}", e.without_url()))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| {
                LlmError::NetworkError(format!("failed to read response: {}", e.without_url()))
            })?;

        if !status.is_success() {
            return Err(LlmError::ApiError(format!(
                "API error (status {}): {}",
                status.as_u16(),
                text
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.ensure_configured()?;

        let body = GeminiRequest {
            contents: Self::convert_messages(&request.messages),
        };

        debug!(model = %request.model, "Sending generateContent request");
        let response = self.post(&request.model, &body).await?;

        let no_response = || LlmError::InvalidResponse("no response generated from API".to_string());
        let candidate = response.candidates.into_iter().next().ok_or_else(no_response)?;
        let text = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(no_response)?;

        let usage = response
            .usage_metadata
            .map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: Some(text),
            model: response.model_version.unwrap_or(request.model),
            usage,
        })
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_config_default() {
        let config = GeminiConfig::default();
        assert_eq!(config.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_provider_without_key_is_unconfigured() {
        let provider = GeminiProvider::new(GeminiConfig::default()).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert!(!provider.is_configured());
        assert!(matches!(
            provider.ensure_configured(),
            Err(LlmError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = GeminiProvider::new(GeminiConfig {
            api_key: "k".to_string(),
            base_url: "http://localhost:9999/v1beta/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            provider.endpoint("gemini-pro"),
            "http://localhost:9999/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GeminiRequest {
            contents: GeminiProvider::convert_messages(&[Message::user("prompt text")]),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"contents": [{"parts": [{"text": "prompt text"}]}]})
        );
    }

    #[test]
    fn test_response_with_empty_text_part_decodes() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{}]}, "finishReason": "SAFETY"}]
        }))
        .unwrap();

        let content = response.candidates[0].content.as_ref().unwrap();
        assert_eq!(content.parts[0].text, "");
    }
}
