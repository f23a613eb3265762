//! Free-text reasoning about a claim.
//!
//! Reasoning is explanatory only. The [`ReasoningService`] decides when to
//! ask for it, bounds the generator with a timeout, and substitutes a
//! templated analysis for every failure so callers always get text.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use verity_core::verdict::advisory::no_articles;
use verity_core::{classify_reasoning, AdvisoryVerdict, ArticleRecord, VerdictLabel};

use crate::config::ReasoningConfig;
use crate::prompts::{build_reasoning_prompt, REASONING_SYSTEM_PROMPT};
use crate::providers::{CompletionConfig, LlmProvider, Prompt, ProviderError};

mod fallback;

pub use fallback::fallback_reasoning;

/// Prefix marking text that came from the generator.
pub const GENERATED_PREFIX: &str = "AI FACT-CHECK ANALYSIS:\n\n";

/// Rationale handed to the generator for the advisory channel.
const ADVISORY_RATIONALE: &str = "AI analysis requested";

/// Supporting plus contradicting items below which reasoning is requested.
const LIMITED_EVIDENCE: usize = 3;

#[derive(Error, Debug, Clone)]
pub enum ReasoningError {
    #[error("Reasoning generator not configured")]
    NotConfigured,

    #[error("Reasoning generator failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Generated reasoning too short ({len} < {min} chars)")]
    TooShort { len: usize, min: usize },

    #[error("Reasoning timed out after {0:?}")]
    Timeout(Duration),
}

/// Produces prose about a claim, its articles and a verdict.
#[async_trait]
pub trait ReasoningGenerator: Send + Sync {
    async fn generate(
        &self,
        claim: &str,
        articles: &[ArticleRecord],
        verdict: VerdictLabel,
        rationale: &str,
    ) -> Result<String, ReasoningError>;
}

/// Reasoning generator backed by an LLM provider.
pub struct LlmReasoningGenerator {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    min_response_chars: usize,
}

impl LlmReasoningGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &ReasoningConfig) -> Self {
        Self {
            provider,
            completion: CompletionConfig {
                model: config.model.clone(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                timeout: config.timeout,
            },
            min_response_chars: config.min_response_chars,
        }
    }
}

#[async_trait]
impl ReasoningGenerator for LlmReasoningGenerator {
    async fn generate(
        &self,
        claim: &str,
        articles: &[ArticleRecord],
        verdict: VerdictLabel,
        rationale: &str,
    ) -> Result<String, ReasoningError> {
        let prompt = Prompt::new(
            REASONING_SYSTEM_PROMPT,
            build_reasoning_prompt(claim, articles, verdict.as_str(), rationale),
        );

        let completion = self.provider.complete(&prompt, &self.completion).await?;
        let text = completion.text.trim();

        tracing::debug!(
            provider = self.provider.name(),
            model = %completion.model,
            tokens = ?completion.tokens,
            "Reasoning generated"
        );

        let len = text.chars().count();
        if len < self.min_response_chars {
            return Err(ReasoningError::TooShort {
                len,
                min: self.min_response_chars,
            });
        }

        Ok(format!("{}{}", GENERATED_PREFIX, text))
    }
}

/// Reasoning text and whether the generator produced it.
#[derive(Debug, Clone)]
pub struct ReasoningOutcome {
    pub text: String,

    /// Set when `text` is the templated fallback because generation failed
    pub failure: Option<ReasoningError>,
}

impl ReasoningOutcome {
    pub fn is_generated(&self) -> bool {
        self.failure.is_none()
    }
}

/// Advisory verdict plus any failure absorbed while producing it.
#[derive(Debug, Clone)]
pub struct AdvisoryOutcome {
    pub verdict: AdvisoryVerdict,
    pub failure: Option<ReasoningError>,
}

/// Decides when to reason and never fails.
pub struct ReasoningService {
    generator: Option<Arc<dyn ReasoningGenerator>>,
    config: ReasoningConfig,
}

impl ReasoningService {
    pub fn new(generator: Option<Arc<dyn ReasoningGenerator>>, config: ReasoningConfig) -> Self {
        Self { generator, config }
    }

    /// Template-only service.
    pub fn disabled() -> Self {
        Self::new(
            None,
            ReasoningConfig {
                enabled: false,
                ..ReasoningConfig::default()
            },
        )
    }

    /// Whether a verdict warrants generated reasoning.
    ///
    /// True for an UNCLEAR verdict with enough articles, or for thin
    /// evidence (fewer than three directional items) with any articles.
    pub fn should_use_reasoning(
        &self,
        verdict: VerdictLabel,
        supporting: usize,
        contradicting: usize,
        articles: usize,
    ) -> bool {
        if !self.config.enabled {
            return false;
        }

        if verdict == VerdictLabel::Unclear && articles >= self.config.min_articles {
            return true;
        }

        supporting + contradicting < LIMITED_EVIDENCE && articles > 0
    }

    /// Generated reasoning, or the template when generation is disabled,
    /// unconfigured, failing, too short or too slow.
    pub async fn reason(
        &self,
        claim: &str,
        articles: &[ArticleRecord],
        verdict: VerdictLabel,
        rationale: &str,
    ) -> ReasoningOutcome {
        if !self.config.enabled {
            return ReasoningOutcome {
                text: fallback_reasoning(claim, articles.len()),
                failure: None,
            };
        }

        let result = match &self.generator {
            None => Err(ReasoningError::NotConfigured),
            Some(generator) => tokio::time::timeout(
                self.config.timeout,
                generator.generate(claim, articles, verdict, rationale),
            )
            .await
            .unwrap_or(Err(ReasoningError::Timeout(self.config.timeout))),
        };

        match result {
            Ok(text) => ReasoningOutcome {
                text,
                failure: None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "Reasoning unavailable, using template");
                ReasoningOutcome {
                    text: fallback_reasoning(claim, articles.len()),
                    failure: Some(err),
                }
            }
        }
    }

    /// Independent verdict from the generator's prose.
    ///
    /// Without articles the generator is not consulted.
    pub async fn advisory(&self, claim: &str, articles: &[ArticleRecord]) -> AdvisoryOutcome {
        if articles.is_empty() {
            return AdvisoryOutcome {
                verdict: no_articles(),
                failure: None,
            };
        }

        let outcome = self
            .reason(claim, articles, VerdictLabel::Unclear, ADVISORY_RATIONALE)
            .await;
        AdvisoryOutcome {
            verdict: classify_reasoning(&outcome.text),
            failure: outcome.failure,
        }
    }
}
