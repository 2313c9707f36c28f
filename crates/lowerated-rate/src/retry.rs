//! Retry with exponential back-off and jitter for completion requests.
//!
//! Only transport failures that may clear up on their own are retried. A
//! malformed completion is returned immediately since asking again costs
//! tokens and is not guaranteed to help.

use std::future::Future;
use std::time::Duration;

use crate::error::RateError;

const MAX_DELAY: Duration = Duration::from_secs(60);

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connect failures, HTTP 429 and 5xx.
///
/// **Not retriable:** configuration, format and input errors, and any other
/// 4xx status.
pub(crate) fn is_retriable(err: &RateError) -> bool {
    match err {
        RateError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        RateError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        RateError::MissingCredential
        | RateError::InvalidConfig(_)
        | RateError::EmptyCompletion
        | RateError::Format { .. }
        | RateError::UnsupportedFormat(_)
        | RateError::Io { .. }
        | RateError::Csv(_) => false,
    }
}

/// Retry schedule for one completion request.
///
/// Retry `n` (1-based) waits `base_ms × 2^(n-1)`, scaled by a random factor
/// in `0.75..=1.25` and never longer than 60 s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backoff {
    pub(crate) max_retries: u32,
    pub(crate) base_ms: u64,
}

impl Backoff {
    pub(crate) fn delay(self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let nominal =
            Duration::from_millis(self.base_ms.saturating_mul(1u64 << exponent)).min(MAX_DELAY);
        nominal.mul_f64(rand::random_range(0.75..=1.25)).min(MAX_DELAY)
    }

    /// Sends `request` until it succeeds, fails permanently, or the retry
    /// budget is spent. `max_retries = 0` sends exactly once.
    pub(crate) async fn run<T, F, Fut>(self, mut request: F) -> Result<T, RateError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RateError>>,
    {
        let mut retries = 0u32;
        loop {
            let err = match request().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if retries >= self.max_retries || !is_retriable(&err) {
                return Err(err);
            }

            retries += 1;
            let delay = self.delay(retries);
            tracing::warn!(
                retry = retries,
                max_retries = self.max_retries,
                ?delay,
                kind = %err.kind(),
                error = %err,
                "completion request failed, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
