//! Timeout and bounded retry around any [`Generator`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::RngExt;

use super::{GeneratedText, GenerationOptions, Generator};
use crate::error::{ReportError, Result};
use crate::report::ReportRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,
    /// Each attempt is abandoned after this long.
    pub timeout: Duration,
    /// Delay before the second attempt; doubles after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            timeout: Duration::from_secs(60),
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt + 1`, jitter excluded.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }

    fn jitter(&self) -> Duration {
        let max = (self.base_delay.as_millis() / 2) as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max))
    }
}

/// Wraps a generator with a per-attempt timeout and retries transient failures.
///
/// Only [`ReportError::UpstreamUnavailable`] is retried; a rejection or a
/// malformed answer would come back the same way the second time.
pub struct Retrying {
    inner: Arc<dyn Generator>,
    policy: RetryPolicy,
}

impl Retrying {
    pub fn new(inner: Arc<dyn Generator>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Run `call` until it succeeds, fails for good, or attempts run out.
    async fn run<F, Fut>(&self, mut call: F) -> Result<GeneratedText>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<GeneratedText>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let outcome = match tokio::time::timeout(self.policy.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(ReportError::UpstreamUnavailable(format!(
                    "timed out after {:?}",
                    self.policy.timeout
                ))),
            };
            match outcome {
                Ok(generated) => return Ok(generated),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.delay_after(attempt) + self.policy.jitter();
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "generation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "generation failed");
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl Generator for Retrying {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<GeneratedText> {
        self.run(|| self.inner.generate(prompt, options)).await
    }

    async fn generate_report(
        &self,
        request: &ReportRequest,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GeneratedText> {
        self.run(|| self.inner.generate_report(request, prompt, options)).await
    }
}
