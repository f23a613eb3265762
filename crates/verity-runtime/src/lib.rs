//! # verity-runtime
//!
//! Evidence acquisition and the claim-checking pipeline for Verity.
//!
//! This crate performs all I/O: web search, article fetching, NLI scoring
//! and reasoning generation. Decisions are delegated to the deterministic
//! logic in `verity-core`.
//!
//! ## Resilience
//!
//! Every external call is bounded by a timeout, and every failure short of
//! "no sources at all" is absorbed: a failing provider contributes no URLs,
//! a failing fetch no article, a failing scorer no evidence, a failing
//! generator templated text. [`FactChecker::check`] always returns a report.
//!
//! ## Example
//!
//! ```rust,ignore
//! use verity_runtime::{FactChecker, RuntimeConfig};
//!
//! let checker = FactChecker::from_env(RuntimeConfig::default())?;
//! let report = checker.check("The Eiffel Tower is in Paris").await;
//! println!("{}: {}", report.verdict, report.reason);
//! ```

use thiserror::Error;

pub mod cache;
pub mod config;
pub mod fetch;
pub mod nli;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod ranker;
pub mod reasoning;
pub mod resilience;
pub mod search;

pub use cache::{CacheStats, TtlCache};
pub use config::{ConfigError, RuntimeConfig};
pub use fetch::{ArticleFetcher, ArticleParser, ContentSource, FetchError, FetchReport};
pub use nli::{HuggingFaceNliScorer, NliScorer};
pub use pipeline::{FactChecker, FactCheckerBuilder};
pub use providers::{LlmProvider, ProviderError};
pub use ranker::{EvidenceRanker, RankedEvidence};
pub use reasoning::{ReasoningError, ReasoningGenerator, ReasoningService};
pub use search::{SearchError, SearchOrchestrator, SearchProvider, SearchRequest};

/// Failure modes of the pipeline.
///
/// Only `Search` with no sources ends a check early; the rest are absorbed
/// and reported in `CheckReport::absorbed_failures`.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Evidence analysis failed for {url}: {source}")]
    Analysis {
        url: String,
        #[source]
        source: ProviderError,
    },

    #[error("Reasoning failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}
