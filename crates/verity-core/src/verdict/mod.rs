//! Verdict determination.
//!
//! - [`engine`]: the authoritative rule-based decision
//! - [`fabrication`]: lexical heuristic consulted by the engine
//! - [`advisory`]: keyword classifier for generated reasoning

pub mod advisory;
pub mod engine;
pub mod fabrication;

pub use advisory::classify_reasoning;
pub use engine::{build_rationale, VerdictConfig, VerdictEngine};
