//! Runtime configuration.
//!
//! Loaded from YAML; every section falls back to its defaults, so an empty
//! document is a valid configuration. Durations are human-readable strings
//! such as `"35s"` or `"1h"`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use verity_core::credibility::default_credible_domains;
use verity_core::{EvidenceThresholds, VerdictConfig};

use crate::resilience::CircuitBreakerConfig;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

/// Top-level configuration for the fact-checking pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub evidence: EvidenceConfig,
    pub verdict: VerdictConfig,
    pub reasoning: ReasoningConfig,
    pub search_cache: CacheConfig,
    pub article_cache: CacheConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub credible_domains: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            fetch: FetchConfig::default(),
            evidence: EvidenceConfig::default(),
            verdict: VerdictConfig::default(),
            reasoning: ReasoningConfig::default(),
            search_cache: CacheConfig::default(),
            article_cache: CacheConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            credible_domains: default_credible_domains(),
        }
    }
}

/// Search orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of URLs returned per claim
    pub result_count: usize,

    /// Domains appended to provider queries as `-site:` filters
    pub excluded_sites: Vec<String>,

    /// Per-call provider timeout
    #[serde(with = "duration_str")]
    pub timeout: Duration,

    /// Attempts per provider call
    pub max_retries: usize,

    /// First exponential backoff delay after a timeout
    #[serde(with = "duration_str")]
    pub backoff_base: Duration,

    /// Delay before retrying a rate-limited call without a Retry-After hint
    #[serde(with = "duration_str")]
    pub rate_limit_delay: Duration,

    /// Serve repeated queries from the search cache
    pub reuse_cached: bool,

    /// Result links with these suffixes are dropped
    pub excluded_extensions: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_count: 7,
            excluded_sites: [
                "twitter.com",
                "youtube.com",
                "facebook.com",
                "tiktok.com",
                "reddit.com",
                "pinterest.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            timeout: Duration::from_secs(35),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(5),
            reuse_cached: true,
            excluded_extensions: [".pdf", ".doc", ".docx", ".ppt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Article fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum in-flight fetches
    pub concurrency: usize,

    #[serde(with = "duration_str")]
    pub timeout: Duration,

    pub user_agent: String,

    /// Responses larger than this are rejected
    pub max_body_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout: Duration::from_secs(35),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Evidence scoring and categorization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    pub min_entailment: f64,
    pub min_contradiction: f64,

    /// Scored sentences are kept only above this entailment or contradiction
    pub keep_threshold: f64,

    /// Sentences per NLI scorer call
    pub batch_size: usize,

    pub max_sentences_per_article: usize,

    /// Sentences longer than this many words pass the relevance filter
    pub min_relevant_tokens: usize,

    /// Bound on one NLI scorer call
    #[serde(with = "duration_str")]
    pub scorer_timeout: Duration,
}

impl EvidenceConfig {
    pub fn thresholds(&self) -> EvidenceThresholds {
        EvidenceThresholds {
            min_entailment: self.min_entailment,
            min_contradiction: self.min_contradiction,
        }
    }
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        let thresholds = EvidenceThresholds::default();
        Self {
            min_entailment: thresholds.min_entailment,
            min_contradiction: thresholds.min_contradiction,
            keep_threshold: 0.4,
            batch_size: 6,
            max_sentences_per_article: 4,
            min_relevant_tokens: 5,
            scorer_timeout: Duration::from_secs(60),
        }
    }
}

/// Generated reasoning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub enabled: bool,

    /// Articles required before an UNCLEAR verdict triggers reasoning
    pub min_articles: usize,

    #[serde(with = "duration_str")]
    pub timeout: Duration,

    /// Shorter responses are treated as failures
    pub min_response_chars: usize,

    pub model: String,

    pub max_tokens: u32,

    pub temperature: f32,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_articles: 1,
            timeout: Duration::from_secs(60),
            min_response_chars: 100,
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// TTL cache settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(with = "duration_str")]
    pub ttl: Duration,

    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_size: 1000,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_interval = [
            ("evidence.min_entailment", self.evidence.min_entailment),
            ("evidence.min_contradiction", self.evidence.min_contradiction),
            ("evidence.keep_threshold", self.evidence.keep_threshold),
            ("verdict.strong_threshold", self.verdict.strong_threshold),
        ];
        for (field, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("{} is outside [0, 1]", value),
                });
            }
        }

        let positive = [
            ("search.result_count", self.search.result_count),
            ("search.max_retries", self.search.max_retries),
            ("fetch.concurrency", self.fetch.concurrency),
            ("evidence.batch_size", self.evidence.batch_size),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Curated domains, or the built-in list when none are configured.
    pub fn credible_domains(&self) -> Vec<String> {
        if self.credible_domains.is_empty() {
            default_credible_domains()
        } else {
            self.credible_domains.clone()
        }
    }
}

/// Serde adapter for `Duration` as a humantime string (`"35s"`, `"1h"`).
pub(crate) mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
