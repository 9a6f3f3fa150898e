use crate::bio::chunk::Chunker;
use crate::core::pipeline::ChunkResult;
use crate::{BlastScanError, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// One row of the result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub sequence_number: u64,
    pub unit: String,
    pub best_match_id: i32,
}

/// Name of the result table for a run started at `started`.
pub fn output_file_name<Tz: TimeZone>(started: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("blast_results_{}.txt", started.format("%Y%m%d_%H%M%S"))
}

/// Cuts completed chunks into display units and numbers them.
///
/// The writer owns the row counter: numbering starts at 1 and runs across
/// every chunk written through the same writer. Skipped chunks contribute
/// no rows and consume no numbers.
pub struct ResultWriter {
    display: Chunker,
    next_sequence_number: u64,
}

impl ResultWriter {
    pub fn new(display_width: usize) -> Result<Self> {
        Ok(Self {
            display: Chunker::new(display_width)?,
            next_sequence_number: 1,
        })
    }

    pub fn next_sequence_number(&self) -> u64 {
        self.next_sequence_number
    }

    /// Rows for `results`, in chunk then unit order.
    pub fn records(&mut self, results: &[ChunkResult]) -> Vec<OutputRecord> {
        let mut records = Vec::new();
        for result in results {
            let Some(verdict) = result.verdict() else {
                debug!("Chunk {} skipped, no rows emitted", result.index);
                continue;
            };
            let best_match_id = verdict.best_match_id();
            for unit in self.display.split(&result.chunk) {
                records.push(OutputRecord {
                    sequence_number: self.next_sequence_number,
                    unit: unit.to_string(),
                    best_match_id,
                });
                self.next_sequence_number += 1;
            }
        }
        records
    }

    /// Write rows as `sequence_number,unit,best_match_id`, no header.
    pub fn write_to<W: Write>(&mut self, writer: W, results: &[ChunkResult]) -> Result<usize> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        let records = self.records(results);
        for record in &records {
            csv.serialize(record)
                .map_err(|e| BlastScanError::Output(format!("Failed to write row: {}", e)))?;
        }
        csv.flush()?;
        Ok(records.len())
    }

    /// Create (or truncate) `path` and write all rows to it.
    pub fn write_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        results: &[ChunkResult],
    ) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            BlastScanError::Output(format!("Cannot create {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        let rows = self.write_to(&mut writer, results)?;
        writer.flush()?;
        debug!("Wrote {} rows to {}", rows, path.display());
        Ok(rows)
    }
}
