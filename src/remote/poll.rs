use super::{JobClient, JobError, JobId, JobStatus};
use crate::core::config::PollingConfig;
use std::time::Duration;
use tracing::{debug, warn};

/// How long to keep asking whether a job is done.
///
/// `Waiting` answers are retried at a fixed interval. Unrecognised answers
/// back off exponentially and give up after `max_indeterminate` in a row.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay after a `Waiting` answer
    pub interval: Duration,
    /// Upper bound on status requests for a single job
    pub max_polls: u32,
    /// Consecutive `Unknown` answers tolerated before giving up
    pub max_indeterminate: u32,
    /// First delay after an `Unknown` answer
    pub indeterminate_backoff: Duration,
    pub multiplier: f32,
    pub max_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            max_polls: config.max_polls,
            max_indeterminate: config.max_indeterminate,
            indeterminate_backoff: Duration::from_millis(config.indeterminate_backoff_ms),
            multiplier: config.backoff_multiplier,
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        }
    }
}

impl PollPolicy {
    /// Policy with every delay set to zero, for tests and dry runs.
    pub fn immediate(max_polls: u32, max_indeterminate: u32) -> Self {
        Self {
            interval: Duration::ZERO,
            max_polls,
            max_indeterminate,
            indeterminate_backoff: Duration::ZERO,
            multiplier: 1.0,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before the next poll after the `streak`-th consecutive Unknown.
    pub fn indeterminate_delay(&self, streak: u32) -> Duration {
        let mut backoff = self.indeterminate_backoff.as_millis() as f32;
        for _ in 1..streak {
            backoff *= self.multiplier;
        }
        Duration::from_millis(backoff.min(self.max_backoff.as_millis() as f32) as u64)
    }
}

/// Poll `rid` until the service reports it ready.
///
/// Returns the number of status requests made. Transport failures are
/// passed through unchanged.
pub fn wait_until_ready<J: JobClient + ?Sized>(
    client: &J,
    rid: &JobId,
    policy: &PollPolicy,
) -> Result<u32, JobError> {
    let mut polls = 0u32;
    let mut unknown_streak = 0u32;

    loop {
        polls += 1;

        let delay = match client.poll_status(rid)? {
            JobStatus::Ready => {
                debug!("Job {} ready after {} polls", rid, polls);
                return Ok(polls);
            }
            JobStatus::Waiting => {
                unknown_streak = 0;
                debug!("Job {} waiting (poll {})", rid, polls);
                policy.interval
            }
            JobStatus::Unknown => {
                unknown_streak += 1;
                if unknown_streak >= policy.max_indeterminate {
                    return Err(JobError::Indeterminate {
                        rid: rid.clone(),
                        attempts: unknown_streak,
                    });
                }
                let delay = policy.indeterminate_delay(unknown_streak);
                warn!(
                    "Unrecognised status for job {} ({}/{}), retrying in {:?}",
                    rid, unknown_streak, policy.max_indeterminate, delay
                );
                delay
            }
        };

        // no sleep once the budget is spent
        if polls >= policy.max_polls {
            return Err(JobError::PollLimitExceeded {
                rid: rid.clone(),
                polls,
            });
        }
        pause(delay);
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
