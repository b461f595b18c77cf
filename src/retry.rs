//! Opt-in retries for synchronous provider requests
//!
//! Capability calls fail fast by default. Setting
//! [`ServiceConfig::retry_policy`](crate::ServiceConfig::retry_policy) re-issues
//! requests that failed with a transient error (see
//! [`ServiceError::is_retryable`]) using exponential backoff. Job polling has
//! its own budget in [`PollPolicy`](crate::PollPolicy) and is never retried.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap on any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
    /// Random spread applied to each delay, as a fraction of it (0 disables)
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub const fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Backoff before retry number `retry` (0-based), without jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .max(1.0)
            .powi(retry.min(i32::MAX as u32) as i32);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        if !millis.is_finite() || millis >= self.max_delay.as_millis() as f64 {
            return self.max_delay;
        }
        Duration::from_millis(millis as u64)
    }

    /// Backoff before retry number `retry`, spread by `jitter`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        let spread = self.jitter.clamp(0.0, 1.0);
        if spread == 0.0 || base.is_zero() {
            return base;
        }
        let factor = rand::thread_rng().gen_range(1.0 - spread..=1.0 + spread);
        base.mul_f64(factor).min(self.max_delay)
    }
}

/// Run `operation`, retrying per `policy` when it is set.
///
/// With `None` the operation runs exactly once.
pub async fn with_retry<F, Fut, T>(policy: Option<&RetryPolicy>, mut operation: F) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let Some(policy) = policy else {
        return operation().await;
    };

    let max_attempts = policy.max_attempts.max(1);
    let mut retries = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && retries + 1 < max_attempts => {
                let delay = policy.delay_for(retries);
                retries += 1;
                tracing::debug!(
                    "Retry {}/{} in {:?} after: {}",
                    retries,
                    max_attempts - 1,
                    delay,
                    error
                );
                sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
