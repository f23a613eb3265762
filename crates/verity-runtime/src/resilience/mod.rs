//! Resilience patterns for verity-runtime.
//!
//! This module provides:
//! - Circuit breaker to stop calling providers that keep failing
//! - Retry with backoff for individual provider calls

mod circuit_breaker;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retry::{retry_provider_call, RetryPolicy};
