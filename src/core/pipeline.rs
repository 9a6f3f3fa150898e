use crate::bio::chunk::Chunker;
use crate::bio::sequence::Sequence;
use crate::remote::{wait_until_ready, JobClient, JobError, JobId, PollPolicy};
use crate::report::{extract_verdict, Verdict};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What became of one submitted chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    Completed {
        rid: JobId,
        polls: u32,
        verdict: Verdict,
    },
    Skipped {
        reason: String,
    },
}

/// A chunk together with its outcome. Results stay co-indexed with the
/// chunk list, skipped chunks included.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    /// 1-based position of the chunk in the query
    pub index: usize,
    pub chunk: String,
    pub outcome: ChunkOutcome,
}

impl ChunkResult {
    pub fn verdict(&self) -> Option<&Verdict> {
        match &self.outcome {
            ChunkOutcome::Completed { verdict, .. } => Some(verdict),
            ChunkOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Skipped { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub matches: usize,
}

impl RunSummary {
    pub fn from_results(results: &[ChunkResult]) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.verdict() {
                Some(verdict) => {
                    summary.completed += 1;
                    if verdict.is_match() {
                        summary.matches += 1;
                    }
                }
                None => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Drives every chunk of a query through submit, poll, fetch and extract,
/// one chunk at a time and in order.
pub struct Pipeline<J: JobClient> {
    client: J,
    chunker: Chunker,
    poll_policy: PollPolicy,
    report_dir: Option<PathBuf>,
    progress: ProgressBar,
}

impl<J: JobClient> Pipeline<J> {
    pub fn new(client: J, chunker: Chunker, poll_policy: PollPolicy) -> Self {
        Self {
            client,
            chunker,
            poll_policy,
            report_dir: None,
            progress: ProgressBar::hidden(),
        }
    }

    /// Keep every fetched raw report under `dir`.
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn client(&self) -> &J {
        &self.client
    }

    pub fn run(&self, sequence: &Sequence) -> Vec<ChunkResult> {
        let chunks = self.chunker.split(sequence.as_str());
        self.progress.set_length(chunks.clone().count() as u64);

        let results: Vec<ChunkResult> = chunks
            .enumerate()
            .map(|(i, chunk)| {
                self.progress.set_message(format!("chunk {}", i + 1));
                let result = self.process_chunk(i + 1, chunk);
                self.progress.inc(1);
                result
            })
            .collect();

        self.progress.finish_and_clear();
        let summary = RunSummary::from_results(&results);
        info!(
            "Processed {} chunks: {} completed, {} skipped, {} with matches",
            summary.total, summary.completed, summary.skipped, summary.matches
        );
        results
    }

    /// Run one chunk to completion. Remote failures become a skipped outcome.
    pub fn process_chunk(&self, index: usize, chunk: &str) -> ChunkResult {
        let outcome = match self.resolve(index, chunk) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Skipping chunk {}: {}", index, e);
                ChunkOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        };
        ChunkResult {
            index,
            chunk: chunk.to_string(),
            outcome,
        }
    }

    fn resolve(&self, index: usize, chunk: &str) -> Result<ChunkOutcome, JobError> {
        let rid = self
            .client
            .submit(chunk)?
            .ok_or(JobError::SubmissionRejected)?;

        let polls = wait_until_ready(&self.client, &rid, &self.poll_policy)?;
        let report = self.client.fetch_report(&rid)?;

        if let Some(dir) = &self.report_dir {
            if let Err(e) = save_report(dir, index, &rid, &report) {
                warn!("Could not keep report for chunk {}: {}", index, e);
            }
        }

        let verdict = extract_verdict(&report);
        info!(
            "Chunk {} (job {}): best match {} ({:.2}% identity, bit score {})",
            index,
            rid,
            verdict.best_match_id(),
            verdict.percent_identity,
            verdict.bit_score
        );
        Ok(ChunkOutcome::Completed {
            rid,
            polls,
            verdict,
        })
    }
}

fn save_report(dir: &Path, index: usize, rid: &JobId, report: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("chunk_{}_{}.xml", index, rid));
    std::fs::write(&path, report)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::JobStatus;
    use crate::report::MatchOutcome;

    struct FixedClient {
        rid: Option<&'static str>,
        report: &'static str,
    }

    impl JobClient for FixedClient {
        fn submit(&self, _query: &str) -> Result<Option<JobId>, JobError> {
            Ok(self.rid.map(JobId::new))
        }

        fn poll_status(&self, _rid: &JobId) -> Result<JobStatus, JobError> {
            Ok(JobStatus::Ready)
        }

        fn fetch_report(&self, _rid: &JobId) -> Result<String, JobError> {
            Ok(self.report.to_string())
        }
    }

    #[test]
    fn test_missing_rid_skips_chunk() {
        let pipeline = Pipeline::new(
            FixedClient { rid: None, report: "" },
            Chunker::new(10).unwrap(),
            PollPolicy::immediate(3, 3),
        );
        let result = pipeline.process_chunk(1, "ACGT");
        assert!(result.is_skipped());
        assert_eq!(
            result.outcome,
            ChunkOutcome::Skipped {
                reason: "service did not return a request id".to_string()
            }
        );
    }

    #[test]
    fn test_completed_chunk_carries_verdict() {
        let pipeline = Pipeline::new(
            FixedClient {
                rid: Some("R1"),
                report: "<BlastOutput><BlastOutput_iterations/></BlastOutput>",
            },
            Chunker::new(10).unwrap(),
            PollPolicy::immediate(3, 3),
        );
        let result = pipeline.process_chunk(2, "ACGT");
        assert_eq!(result.index, 2);
        let verdict = result.verdict().unwrap();
        assert_eq!(verdict.outcome, MatchOutcome::NoMatch);
    }

    #[test]
    fn test_reports_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            FixedClient {
                rid: Some("R9"),
                report: "<BlastOutput/>",
            },
            Chunker::new(10).unwrap(),
            PollPolicy::immediate(3, 3),
        )
        .with_report_dir(dir.path().join("reports"));

        pipeline.run(&Sequence::new("ACGTACGTACGT"));
        let kept = std::fs::read_to_string(dir.path().join("reports/chunk_2_R9.xml")).unwrap();
        assert_eq!(kept, "<BlastOutput/>");
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            ChunkResult {
                index: 1,
                chunk: "AC".to_string(),
                outcome: ChunkOutcome::Skipped {
                    reason: "x".to_string(),
                },
            },
            ChunkResult {
                index: 2,
                chunk: "GT".to_string(),
                outcome: ChunkOutcome::Completed {
                    rid: JobId::new("R"),
                    polls: 1,
                    verdict: Verdict {
                        outcome: MatchOutcome::MatchFound,
                        percent_identity: 100.0,
                        bit_score: 60000.0,
                        qualifying_hits: 1,
                    },
                },
            },
        ];
        assert_eq!(
            RunSummary::from_results(&results),
            RunSummary {
                total: 2,
                completed: 1,
                skipped: 1,
                matches: 1
            }
        );
    }
}
