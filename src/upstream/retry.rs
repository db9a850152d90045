//! Bounded retry with exponential backoff for upstream calls.

use std::future::Future;
use std::time::Duration;

use super::UpstreamError;
use crate::config::{UPSTREAM_BASE_BACKOFF_MS, UPSTREAM_MAX_ATTEMPTS};

/// Result of one attempt.
pub enum AttemptOutcome<T> {
    Success(T),
    /// Transient failure (5xx or transport); try again after backoff.
    Retryable(String),
    /// Permanent failure; stop and report.
    Fatal(UpstreamError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: UPSTREAM_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(UPSTREAM_BASE_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay after the zero-based `attempt` failed: base × 2^attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }

    /// Run `attempt` until it succeeds, fails fatally, or the attempt
    /// budget runs out. Backoff sleeps happen only between attempts.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T, UpstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
    {
        for n in 0..self.max_attempts {
            if n > 0 {
                let backoff = self.delay_for(n - 1);
                tracing::debug!(attempt = n + 1, backoff_ms = backoff.as_millis() as u64, "Retrying upstream");
                tokio::time::sleep(backoff).await;
            }
            match attempt(n).await {
                AttemptOutcome::Success(value) => return Ok(value),
                AttemptOutcome::Fatal(err) => return Err(err),
                AttemptOutcome::Retryable(reason) => {
                    tracing::warn!(attempt = n + 1, max = self.max_attempts, reason = %reason, "Upstream attempt failed");
                }
            }
        }
        Err(UpstreamError::Unavailable {
            attempts: self.max_attempts,
        })
    }
}
