//! Job polling
//!
//! Job backends accept a submission and hand back an id that has to be polled
//! until the job reaches a terminal state. Polling is bounded twice: by a
//! maximum number of status checks and by a wall-clock ceiling.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::error::{Result, ServiceError};
use crate::providers::JobHandle;
use crate::router::BackendId;

/// Budget for a poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Maximum number of status checks
    pub max_attempts: u32,
    /// Delay before the second status check
    pub initial_interval: Duration,
    /// Growth factor applied to the delay after each check (1.0 = fixed)
    pub backoff_multiplier: f64,
    /// Upper bound for a single delay
    pub max_interval: Duration,
    /// Wall-clock ceiling for the whole loop
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            initial_interval: Duration::from_secs(1),
            backoff_multiplier: 1.5,
            max_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollPolicy {
    /// A fixed-interval policy.
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            initial_interval: interval,
            backoff_multiplier: 1.0,
            max_interval: interval,
            timeout: interval
                .saturating_mul(max_attempts.max(1))
                .saturating_add(Duration::from_secs(60)),
        }
    }

    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Delay between status check `attempt` (0-based) and the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(attempt as i32);
        let millis = self.initial_interval.as_millis() as f64 * factor;
        Duration::from_millis(millis as u64).min(self.max_interval)
    }
}

/// State of a submitted job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Still queued or running
    Pending,
    /// Finished successfully; carries the final job record
    Succeeded(serde_json::Map<String, serde_json::Value>),
    /// Failed or was canceled upstream
    Failed(String),
}

/// A backend whose jobs can be polled through their handle.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    fn backend(&self) -> BackendId;

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus>;
}

/// Poll `job` until it succeeds, fails, or the policy budget runs out.
///
/// Issues at most `policy.max_attempts` status checks. Exhausting either the
/// attempt budget or the wall-clock ceiling yields
/// [`ServiceError::ProviderTimeout`].
pub async fn poll_until_terminal<S>(
    source: &S,
    job: &JobHandle,
    policy: &PollPolicy,
) -> Result<serde_json::Map<String, serde_json::Value>>
where
    S: JobStatusSource + ?Sized,
{
    let job_id = job.id.as_str();
    let started = Instant::now();
    let mut attempts = 0u32;

    while attempts < policy.max_attempts {
        let status = source.job_status(job).await?;
        attempts += 1;

        match status {
            JobStatus::Succeeded(record) => {
                tracing::debug!(
                    "{} job {} finished after {} status checks",
                    source.backend(),
                    job_id,
                    attempts
                );
                return Ok(record);
            }
            JobStatus::Failed(reason) => {
                return Err(ServiceError::provider(
                    source.backend(),
                    None,
                    format!("job {job_id} failed: {reason}"),
                ));
            }
            JobStatus::Pending => {}
        }

        if attempts == policy.max_attempts {
            break;
        }

        let delay = policy.delay_after(attempts - 1);
        if started.elapsed() + delay > policy.timeout {
            break;
        }
        sleep(delay).await;
    }

    tracing::warn!(
        "{} job {} still pending after {} status checks",
        source.backend(),
        job_id,
        attempts
    );
    Err(ServiceError::ProviderTimeout {
        backend: source.backend(),
        attempts,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Reports `Pending` until `finish_after` checks have been made.
    struct ScriptedJob {
        calls: AtomicU32,
        finish_after: Option<u32>,
        fail: bool,
    }

    impl ScriptedJob {
        fn never() -> Self {
            Self {
                calls: AtomicU32::new(0),
                finish_after: None,
                fail: false,
            }
        }

        fn after(n: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                finish_after: Some(n),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl JobStatusSource for ScriptedJob {
        fn backend(&self) -> BackendId {
            BackendId::Replicate
        }

        async fn job_status(&self, _job: &JobHandle) -> Result<JobStatus> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.finish_after {
                Some(limit) if n >= limit && self.fail => Ok(JobStatus::Failed("boom".into())),
                Some(limit) if n >= limit => {
                    let mut record = serde_json::Map::new();
                    record.insert("status".into(), "succeeded".into());
                    Ok(JobStatus::Succeeded(record))
                }
                _ => Ok(JobStatus::Pending),
            }
        }
    }

    fn handle(id: &str) -> JobHandle {
        JobHandle {
            backend: BackendId::Replicate,
            id: id.to_string(),
            capability: Capability::ImageGeneration,
        }
    }

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy::fixed(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_never_terminal_job_times_out_after_exact_budget() {
        let job = ScriptedJob::never();
        let err = poll_until_terminal(&job, &handle("job-1"), &fast_policy(4))
            .await
            .unwrap_err();

        assert_eq!(job.calls.load(Ordering::SeqCst), 4);
        match err {
            ServiceError::ProviderTimeout {
                backend, attempts, ..
            } => {
                assert_eq!(backend, BackendId::Replicate);
                assert_eq!(attempts, 4);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_job_succeeding_on_third_check() {
        let job = ScriptedJob::after(3);
        let record = poll_until_terminal(&job, &handle("job-2"), &fast_policy(10))
            .await
            .unwrap();
        assert_eq!(record["status"], "succeeded");
        assert_eq!(job.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_job_is_provider_error() {
        let job = ScriptedJob {
            calls: AtomicU32::new(0),
            finish_after: Some(1),
            fail: true,
        };
        let err = poll_until_terminal(&job, &handle("job-3"), &fast_policy(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::ProviderRequest {
                backend: BackendId::Replicate,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_wall_clock_ceiling_stops_early() {
        let job = ScriptedJob::never();
        let policy = PollPolicy::fixed(100, Duration::from_millis(50))
            .with_timeout(Duration::from_millis(120));
        let err = poll_until_terminal(&job, &handle("job-4"), &policy).await.unwrap_err();

        assert!(err.is_timeout());
        let calls = job.calls.load(Ordering::SeqCst);
        assert!(calls < 100, "ceiling should cut the loop short, made {calls} calls");
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = PollPolicy {
            max_attempts: 10,
            initial_interval: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(policy.delay_after(0), Duration::from_millis(100));
        assert_eq!(policy.delay_after(1), Duration::from_millis(200));
        assert_eq!(policy.delay_after(2), Duration::from_millis(400));
        assert_eq!(policy.delay_after(3), Duration::from_millis(500));
    }
}
