//! Google Gemini provider implementation.
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.
//! The system half of a [`Prompt`] is sent as the system instruction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    http,
    secrets::ApiCredential,
    Completion, CompletionConfig, LlmProvider, Prompt, ProviderError,
};

/// Environment variable name for the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider.
pub struct GeminiProvider {
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::explicit(api_key))
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(GEMINI_API_KEY_ENV)?;
        Ok(Self::with_credential(credential))
    }

    fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build_request(prompt: &Prompt, config: &CompletionConfig) -> GeminiRequest {
        let system_instruction = (!prompt.system.is_empty()).then(|| SystemInstruction {
            parts: vec![Part {
                text: prompt.system.clone(),
            }],
        });

        GeminiRequest {
            system_instruction,
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.user.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            },
        }
    }
}

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        prompt: &Prompt,
        config: &CompletionConfig,
    ) -> Result<Completion, ProviderError> {
        let request = Self::build_request(prompt, config);

        // Only expose the credential here, at the point of use
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, config.model
            ))
            .header("x-goog-api-key", self.credential.expose())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| http::send_error(e, config.timeout))?;

        let body: GeminiResponse = http::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| http::body_error(e, config.timeout))?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("response has no candidates".to_string()))?;

        let text = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            tracing::warn!(model = %config.model, "Gemini response stopped by safety filter");
        }

        Ok(Completion {
            text,
            model: body.model_version.unwrap_or_else(|| config.model.clone()),
            tokens: body
                .usage_metadata
                .map(|u| u.prompt_token_count + u.candidates_token_count),
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = GeminiProvider::new("test-key");
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_request_shape() {
        let request = GeminiProvider::build_request(
            &Prompt::new("Be precise.", "Is the sky blue?"),
            &CompletionConfig::default(),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be precise.");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Is the sky blue?");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_empty_system_prompt_omitted() {
        let request =
            GeminiProvider::build_request(&Prompt::new("", "hi"), &CompletionConfig::default());
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let body: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "world"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 2}
            }"#,
        )
        .unwrap();

        assert_eq!(body.candidates.len(), 1);
        assert_eq!(body.usage_metadata.unwrap().prompt_token_count, 10);
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret_key = "gemini-super-secret-key-12345";
        let provider = GeminiProvider::new(secret_key);

        let debug_output = format!("{:?}", provider);
        assert!(
            !debug_output.contains(secret_key),
            "API key was exposed in Debug output!"
        );
        assert!(debug_output.contains("[REDACTED]"));
    }
}
