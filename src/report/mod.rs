//! Interpretation of fetched BLAST reports.

pub mod blast_xml;

pub use blast_xml::{
    extract_verdict, MatchOutcome, Verdict, MIN_BIT_SCORE, MIN_PERCENT_IDENTITY,
};
