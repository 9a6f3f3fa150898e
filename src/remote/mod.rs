//! Remote BLAST job protocol: submit, poll until ready, fetch.

pub mod client;
pub mod poll;

pub use client::{extract_rid, interpret_status, NcbiJobClient, DEFAULT_ENDPOINT};
pub use poll::{wait_until_ready, PollPolicy};

use std::fmt;
use thiserror::Error;

/// Request identifier assigned by the remote service (the RID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(rid: impl Into<String>) -> Self {
        Self(rid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a status check said about a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Ready,
    Waiting,
    /// Neither ready nor waiting; the service gave no usable signal
    Unknown,
}

/// Failure of a single remote job. Never fatal for a whole run.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("service did not return a request id")]
    SubmissionRejected,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("job {rid} still not ready after {polls} polls")]
    PollLimitExceeded { rid: JobId, polls: u32 },

    #[error("job {rid} returned {attempts} consecutive unrecognised status responses")]
    Indeterminate { rid: JobId, attempts: u32 },
}

impl From<reqwest::Error> for JobError {
    fn from(err: reqwest::Error) -> Self {
        JobError::Transport(err.to_string())
    }
}

/// The three remote phases a chunk goes through.
///
/// All calls block. Implementations report a missing RID as `Ok(None)` from
/// [`JobClient::submit`], keeping `Err` for transport problems.
pub trait JobClient {
    fn submit(&self, query: &str) -> Result<Option<JobId>, JobError>;

    fn poll_status(&self, rid: &JobId) -> Result<JobStatus, JobError>;

    fn fetch_report(&self, rid: &JobId) -> Result<String, JobError>;
}

impl<T: JobClient + ?Sized> JobClient for &T {
    fn submit(&self, query: &str) -> Result<Option<JobId>, JobError> {
        (**self).submit(query)
    }

    fn poll_status(&self, rid: &JobId) -> Result<JobStatus, JobError> {
        (**self).poll_status(rid)
    }

    fn fetch_report(&self, rid: &JobId) -> Result<String, JobError> {
        (**self).fetch_report(rid)
    }
}
