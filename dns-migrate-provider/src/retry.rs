//! Bounded retry with exponential backoff.
//!
//! Wraps one attempt of an operation. Each failure is classified through
//! [`ProviderError::is_retryable`]; authentication and validation failures return on the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::{ProviderError, Result};

/// Upper bound for a server-provided `retry_after`.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retrying.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles afterwards.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// `attempts` tries with no delay in between. Handy in tests.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Wait before retry number `retry` (0-based).
    ///
    /// A rate-limit error carrying `retry_after` overrides the backoff, capped at 30s.
    pub fn delay_for(&self, error: &ProviderError, retry: u32) -> Duration {
        if let ProviderError::RateLimited {
            retry_after: Some(secs),
            ..
        } = error
        {
            return Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS));
        }
        let factor = 1_u32.checked_shl(retry.min(16)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the attempts
/// are used up. The last error is returned.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && e.is_retryable() => {
                let delay = policy.delay_for(&e, attempt - 1);
                log::warn!(
                    "[{}] {label} failed (attempt {attempt}/{max_attempts}), retrying in {:.1}s: {e}",
                    e.provider(),
                    delay.as_secs_f32(),
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
