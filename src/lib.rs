pub mod bio;
pub mod cli;
pub mod core;
pub mod output;
pub mod remote;
pub mod report;

pub use crate::core::pipeline::{ChunkOutcome, ChunkResult, Pipeline, RunSummary};
pub use crate::remote::{JobClient, JobError, JobStatus, NcbiJobClient};
pub use crate::report::{extract_verdict, MatchOutcome, Verdict};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlastScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, BlastScanError>;
