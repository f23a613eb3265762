//! Natural-language-inference scoring.
//!
//! The scorer is an opaque function from `(claim, sentence)` pairs to
//! entailment / contradiction / neutral probabilities. The default
//! implementation calls a hosted text-classification model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use verity_core::NliScores;

use crate::providers::{http, ApiCredential, ProviderError};

pub const HUGGINGFACE_API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

pub const DEFAULT_NLI_MODEL: &str = "microsoft/deberta-v3-base";

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Scores sentences against a claim.
#[async_trait]
pub trait NliScorer: Send + Sync {
    /// One score triple per sentence, in input order.
    async fn score_batch(
        &self,
        claim: &str,
        sentences: &[String],
    ) -> Result<Vec<NliScores>, ProviderError>;

    fn name(&self) -> &str;
}

/// Hosted inference API scorer.
///
/// Sends each pair as `"{claim} [SEP] {sentence}"` and reads the label
/// scores of the classification output.
pub struct HuggingFaceNliScorer {
    credential: Option<ApiCredential>,
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for HuggingFaceNliScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceNliScorer")
            .field("credential", &self.credential)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: Vec<String>,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// A batch returns one label list per input; a single input may come back
/// as a bare label list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<Vec<LabelScore>>),
    Single(Vec<LabelScore>),
}

impl HuggingFaceNliScorer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(Some(ApiCredential::explicit(api_key)))
    }

    /// Read `HUGGINGFACE_API_KEY`. Without it every call reports
    /// `NotConfigured`.
    pub fn from_env() -> Self {
        Self::with_credential(ApiCredential::from_env_optional(HUGGINGFACE_API_KEY_ENV))
    }

    fn with_credential(credential: Option<ApiCredential>) -> Self {
        Self {
            credential,
            model: DEFAULT_NLI_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request(claim: &str, sentences: &[String]) -> InferenceRequest {
        InferenceRequest {
            inputs: sentences
                .iter()
                .map(|sentence| format!("{} [SEP] {}", claim, sentence))
                .collect(),
            options: InferenceOptions {
                wait_for_model: true,
            },
        }
    }
}

fn parse_scores(
    response: InferenceResponse,
    expected: usize,
) -> Result<Vec<NliScores>, ProviderError> {
    let batches = match response {
        InferenceResponse::Batch(batches) => batches,
        InferenceResponse::Single(labels) => vec![labels],
    };

    if batches.len() != expected {
        return Err(ProviderError::ParseError(format!(
            "expected {} score sets, got {}",
            expected,
            batches.len()
        )));
    }

    Ok(batches
        .iter()
        .map(|labels| {
            NliScores::from_labels(labels.iter().map(|l| (l.label.as_str(), l.score)))
        })
        .collect())
}

#[async_trait]
impl NliScorer for HuggingFaceNliScorer {
    async fn score_batch(
        &self,
        claim: &str,
        sentences: &[String],
    ) -> Result<Vec<NliScores>, ProviderError> {
        let Some(credential) = &self.credential else {
            return Err(ProviderError::NotConfigured(format!(
                "set {}",
                HUGGINGFACE_API_KEY_ENV
            )));
        };

        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/{}", self.base_url, self.model);
        let request = Self::build_request(claim, sentences);

        tracing::debug!(
            model = %self.model,
            count = sentences.len(),
            "Scoring sentence batch"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| http::send_error(e, self.timeout))?;

        let body: InferenceResponse = http::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| http::body_error(e, self.timeout))?;

        parse_scores(body, sentences.len())
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}
