//! Retry loop for provider calls.
//!
//! Timeouts back off exponentially from `backoff_base`; rate limits wait
//! the server's Retry-After hint or a fixed delay; transport errors wait
//! `backoff_base`. Anything else is returned immediately.

use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::providers::ProviderError;

/// How often and how long to retry one provider call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: usize,
    pub backoff_base: Duration,
    pub rate_limit_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            backoff_base: config.backoff_base,
            rate_limit_delay: config.rate_limit_delay,
        }
    }

    fn timeout_backoff(&self) -> impl Iterator<Item = Duration> {
        ExponentialBuilder::default()
            .with_min_delay(self.backoff_base)
            .with_factor(2.0)
            .with_max_times(self.max_attempts)
            .build()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

/// Run `call` until it succeeds, fails permanently, or attempts run out.
pub async fn retry_provider_call<T, F, Fut>(
    provider: &str,
    policy: &RetryPolicy,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut timeout_delays = policy.timeout_backoff();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retryable() {
            tracing::warn!(provider, attempt, error = %err, "Provider call failed permanently");
            return Err(err);
        }
        if attempt >= policy.max_attempts {
            tracing::error!(provider, attempt, error = %err, "Provider failed after all retries");
            return Err(err);
        }

        let delay = match &err {
            ProviderError::Timeout(_) => timeout_delays.next().unwrap_or(policy.backoff_base),
            ProviderError::RateLimited { retry_after } => {
                retry_after.unwrap_or(policy.rate_limit_delay)
            }
            _ => policy.backoff_base,
        };

        tracing::warn!(
            provider,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Provider call failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
