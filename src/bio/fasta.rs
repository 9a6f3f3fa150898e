use crate::bio::sequence::Sequence;
use crate::{BlastScanError, Result};
use nom::{bytes::complete::tag, combinator::rest, sequence::preceded, IResult};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, info};

/// Default cap on the number of residues kept from the input.
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 5000;

/// Parse a FASTA header line, returning the text after the marker
fn parse_header(line: &str) -> IResult<&str, &str> {
    preceded(tag(">"), rest)(line)
}

/// Build a single sequence from FASTA-style text.
///
/// Header lines are metadata: the last one seen provides the identifier.
/// Every other line is trimmed and appended in file order, so multi-record
/// input collapses into one sequence. The result is cut to `max_len`
/// residues without complaint.
pub fn parse_sequence_text(text: &str, max_len: usize) -> Sequence {
    let mut id = String::new();
    let mut residues = String::new();

    for line in text.lines() {
        accumulate_line(line, &mut id, &mut residues);
    }

    finish(id, residues, max_len)
}

/// Read and truncate the query sequence at `path`.
///
/// A missing file is reported as [`BlastScanError::InputNotFound`]; other
/// read failures surface as IO errors. Both are fatal for a run.
pub fn load_sequence<P: AsRef<Path>>(path: P, max_len: usize) -> Result<Sequence> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => BlastScanError::InputNotFound(path.to_path_buf()),
        _ => BlastScanError::Io(e),
    })?;

    let mut id = String::new();
    let mut residues = String::new();
    for line in BufReader::new(file).lines() {
        accumulate_line(&line?, &mut id, &mut residues);
    }

    let sequence = finish(id, residues, max_len);
    info!(
        "Loaded {} residues from {}",
        sequence.len(),
        path.display()
    );
    Ok(sequence)
}

fn accumulate_line(line: &str, id: &mut String, residues: &mut String) {
    match parse_header(line) {
        Ok((_, header)) => {
            *id = header.trim().to_string();
        }
        Err(_) => residues.push_str(line.trim()),
    }
}

fn finish(id: String, residues: String, max_len: usize) -> Sequence {
    let mut sequence = Sequence::new(residues).with_id(id);
    let before = sequence.len();
    if sequence.truncate(max_len) {
        debug!("Truncated sequence from {} to {} residues", before, max_len);
    }
    sequence
}
