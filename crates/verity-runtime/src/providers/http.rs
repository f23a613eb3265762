//! Shared reqwest plumbing for every HTTP collaborator.

use std::time::Duration;

use super::ProviderError;

/// Build a client with the given default timeout and user agent.
pub(crate) fn build_client(
    timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ProviderError::HttpError(e.to_string()))
}

/// Map a send failure onto the provider error taxonomy.
pub(crate) fn send_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::HttpError(err.to_string())
    }
}

/// Map a failure reading or decoding a response body. A body that stalls
/// past the timeout is a retryable `Timeout`, not a parse error.
pub(crate) fn body_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_decode() && !err.is_timeout() {
        ProviderError::ParseError(err.to_string())
    } else {
        send_error(err, timeout)
    }
}

/// Turn non-success statuses into errors.
///
/// 429 becomes `RateLimited` with the Retry-After hint in seconds, 401/403
/// become `AuthError`, anything else `ApiError` carrying the response body.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == 429 {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(ProviderError::RateLimited { retry_after });
    }

    if matches!(status.as_u16(), 401 | 403) {
        return Err(ProviderError::AuthError);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ProviderError::ApiError {
        status: status.as_u16(),
        message: message.chars().take(200).collect(),
    })
}
