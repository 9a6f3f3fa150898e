//! Result files: the per-unit match table and the optional JSON summary.

pub mod summary;
pub mod writer;

pub use summary::{write_summary, ChunkSummary, SummaryDocument};
pub use writer::{output_file_name, OutputRecord, ResultWriter};
