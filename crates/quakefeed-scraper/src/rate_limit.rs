//! Retry utilities for bulletin fetches.
//!
//! Transient failures (network errors, 429, 5xx, empty bodies from a page
//! that has not finished rendering) are retried with exponential backoff.
//! Everything else is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable:
/// - [`FetchError::RateLimited`]
/// - [`FetchError::Http`]: connection reset, timeout, DNS hiccup.
/// - [`FetchError::UnexpectedStatus`] with a 5xx status.
/// - [`FetchError::EmptyDocument`]
///
/// Not retriable: 4xx statuses, invalid selectors, exhausted strategies.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::RateLimited { .. } | FetchError::Http(_) | FetchError::EmptyDocument { .. } => {
            true
        }
        FetchError::UnexpectedStatus { status, .. } => *status >= 500,
        FetchError::InvalidSelector(_) | FetchError::AllAttemptsFailed { .. } => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before the n-th retry is `backoff_base_ms * 2^(n-1)`, capped at
/// 30 s. With `max_retries = 2` the operation runs at most 3 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                let delay_ms = backoff_base_ms
                    .saturating_mul(1u64 << attempt.min(20))
                    .min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient bulletin fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}
