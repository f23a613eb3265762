//! Shared plumbing for external services: the error taxonomy every HTTP
//! collaborator maps onto, API key handling, and the LLM seam used by
//! reasoning generation.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub(crate) mod http;
pub mod secrets;

#[cfg(feature = "gemini")]
mod gemini;

pub use secrets::{ApiCredential, CredentialOrigin};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiProvider, GEMINI_API_KEY_ENV};

/// Errors from external providers.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::HttpError(_)
                | ProviderError::RateLimited { .. }
                | ProviderError::Timeout(_)
        )
    }
}

/// Model settings for one completion.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

/// A single-turn prompt: standing instructions plus the request itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,

    /// Model that actually answered, when the service reports it
    pub model: String,

    /// Prompt plus output tokens, when reported
    pub tokens: Option<u32>,
}

/// A text-generation backend.
///
/// Only the reasoning service calls this. Verdicts never depend on it.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        prompt: &Prompt,
        config: &CompletionConfig,
    ) -> Result<Completion, ProviderError>;

    fn name(&self) -> &str;
}
