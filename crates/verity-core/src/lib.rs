//! # verity-core
//!
//! Deterministic claim-verification logic.
//!
//! This crate turns scored evidence into a verdict, answering:
//! - Which sentences support or contradict the claim?
//! - How strong is that evidence, and how credible are its sources?
//! - What verdict follows, and why?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No I/O**: Search, fetching and scoring live in `verity-runtime`
//! 3. **Explainable**: Every verdict carries a fixed reason string
//!
//! ## Example
//!
//! ```rust,ignore
//! use verity_core::{EvidenceThresholds, VerdictEngine};
//!
//! let categorized = EvidenceThresholds::default().categorize(&evidence);
//! let decision = VerdictEngine::default().decide_categorized(Some(claim), &categorized);
//! println!("{}: {}", decision.label, decision.reason);
//! ```

pub mod credibility;
pub mod evidence;
pub mod facts;
pub mod fallback;
pub mod query;
pub mod types;
pub mod verdict;

// Re-export main types at crate root
pub use credibility::{source_domain, CredibilityTable};
pub use evidence::{CategorizedEvidence, EvidenceBucket, EvidenceThresholds};
pub use facts::known_fact_evidence;
pub use fallback::{FallbackCatalog, FallbackTopic};
pub use query::SearchQuery;
pub use types::{
    AdvisoryVerdict, ArticleRecord, CheckReport, EvidenceItem, NliScores, SourceMeta,
    VerdictDecision, VerdictLabel,
};
pub use verdict::{build_rationale, classify_reasoning, VerdictConfig, VerdictEngine};
