use crate::core::pipeline::{ChunkOutcome, ChunkResult, RunSummary};
use crate::{BlastScanError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub started_at: DateTime<Local>,
    pub results_file: PathBuf,
    pub total_chunks: usize,
    pub completed: usize,
    pub skipped: usize,
    pub matches: usize,
    pub chunks: Vec<ChunkSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSummary {
    pub index: usize,
    pub length: usize,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_match_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_identity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&ChunkResult> for ChunkSummary {
    fn from(result: &ChunkResult) -> Self {
        let length = result.chunk.chars().count();
        match &result.outcome {
            ChunkOutcome::Completed { rid, verdict, .. } => ChunkSummary {
                index: result.index,
                length,
                status: "completed".to_string(),
                rid: Some(rid.to_string()),
                best_match_id: Some(verdict.best_match_id()),
                percent_identity: Some(verdict.percent_identity),
                bit_score: Some(verdict.bit_score),
                reason: None,
            },
            ChunkOutcome::Skipped { reason } => ChunkSummary {
                index: result.index,
                length,
                status: "skipped".to_string(),
                rid: None,
                best_match_id: None,
                percent_identity: None,
                bit_score: None,
                reason: Some(reason.clone()),
            },
        }
    }
}

impl SummaryDocument {
    pub fn new(
        started_at: DateTime<Local>,
        results_file: PathBuf,
        results: &[ChunkResult],
    ) -> Self {
        let summary = RunSummary::from_results(results);
        Self {
            started_at,
            results_file,
            total_chunks: summary.total,
            completed: summary.completed,
            skipped: summary.skipped,
            matches: summary.matches,
            chunks: results.iter().map(ChunkSummary::from).collect(),
        }
    }
}

/// Write the per-chunk detail of a run as pretty JSON.
pub fn write_summary<P: AsRef<Path>>(path: P, document: &SummaryDocument) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        BlastScanError::Output(format!("Cannot create {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)
        .map_err(|e| BlastScanError::Output(format!("Failed to write summary: {}", e)))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::JobId;
    use crate::report::Verdict;

    #[test]
    fn test_summary_round_trips_through_json() {
        let results = vec![
            ChunkResult {
                index: 1,
                chunk: "ACGT".to_string(),
                outcome: ChunkOutcome::Completed {
                    rid: JobId::new("RID42"),
                    polls: 3,
                    verdict: Verdict::no_match(),
                },
            },
            ChunkResult {
                index: 2,
                chunk: "GG".to_string(),
                outcome: ChunkOutcome::Skipped {
                    reason: "service did not return a request id".to_string(),
                },
            },
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let document =
            SummaryDocument::new(Local::now(), PathBuf::from("blast_results_x.txt"), &results);
        write_summary(&path, &document).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_chunks"], 2);
        assert_eq!(value["skipped"], 1);
        assert_eq!(value["chunks"][0]["rid"], "RID42");
        assert_eq!(value["chunks"][0]["best_match_id"], -1);
        assert_eq!(value["chunks"][1]["status"], "skipped");
        assert!(value["chunks"][1].get("rid").is_none());
    }
}
