//! Verdict extraction from BLAST XML output.
//!
//! The scan walks every HSP in document order and keeps a single running
//! accumulator for identity, alignment length, percent identity and bit
//! score. Nothing is reset between hits, so a hit with a missing or zero
//! alignment length reuses the percent identity of the hit before it, and
//! the reported metrics are those of the last bit score seen, qualifying or
//! not.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{debug, warn};

/// A hit must exceed this percent identity to count as a match.
pub const MIN_PERCENT_IDENTITY: f64 = 99.0;
/// A hit must exceed this bit score to count as a match.
pub const MIN_BIT_SCORE: f64 = 54998.0;

const ITERATIONS: &[u8] = b"BlastOutput_iterations";
const HSP_IDENTITY: &[u8] = b"Hsp_identity";
const HSP_ALIGN_LEN: &[u8] = b"Hsp_align-len";
const HSP_BIT_SCORE: &[u8] = b"Hsp_bit-score";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    MatchFound,
    NoMatch,
}

impl MatchOutcome {
    /// Numeric id written to the output file: 1 for a match, -1 otherwise.
    pub fn best_match_id(&self) -> i32 {
        match self {
            MatchOutcome::MatchFound => 1,
            MatchOutcome::NoMatch => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub outcome: MatchOutcome,
    pub percent_identity: f64,
    pub bit_score: f64,
    /// Number of HSPs that cleared both thresholds
    pub qualifying_hits: usize,
}

impl Verdict {
    pub fn no_match() -> Self {
        Self {
            outcome: MatchOutcome::NoMatch,
            percent_identity: 0.0,
            bit_score: 0.0,
            qualifying_hits: 0,
        }
    }

    pub fn best_match_id(&self) -> i32 {
        self.outcome.best_match_id()
    }

    pub fn is_match(&self) -> bool {
        self.outcome == MatchOutcome::MatchFound
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Identity,
    AlignLen,
    BitScore,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            HSP_IDENTITY => Some(Field::Identity),
            HSP_ALIGN_LEN => Some(Field::AlignLen),
            HSP_BIT_SCORE => Some(Field::BitScore),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    identity: i64,
    align_len: Option<i64>,
    percent_identity: f64,
    bit_score: f64,
    qualifying_hits: usize,
}

impl Accumulator {
    fn record(&mut self, field: Field, text: &str) {
        let text = text.trim();
        match field {
            Field::Identity => match text.parse() {
                Ok(value) => self.identity = value,
                Err(_) => debug!("Ignoring unparseable Hsp_identity {:?}", text),
            },
            Field::AlignLen => match text.parse() {
                Ok(value) => self.align_len = Some(value),
                Err(_) => debug!("Ignoring unparseable Hsp_align-len {:?}", text),
            },
            Field::BitScore => match text.parse() {
                Ok(value) => self.score(value),
                Err(_) => debug!("Ignoring unparseable Hsp_bit-score {:?}", text),
            },
        }
    }

    fn score(&mut self, bit_score: f64) {
        self.bit_score = bit_score;
        if let Some(align_len) = self.align_len.filter(|len| *len > 0) {
            self.percent_identity = (self.identity as f64 / align_len as f64) * 100.0;
        }
        if self.percent_identity > MIN_PERCENT_IDENTITY && self.bit_score > MIN_BIT_SCORE {
            self.qualifying_hits += 1;
        }
    }

    fn into_verdict(self) -> Verdict {
        let outcome = if self.qualifying_hits > 0 {
            MatchOutcome::MatchFound
        } else {
            MatchOutcome::NoMatch
        };
        Verdict {
            outcome,
            percent_identity: self.percent_identity,
            bit_score: self.bit_score,
            qualifying_hits: self.qualifying_hits,
        }
    }
}

/// Decide whether `report` contains a qualifying hit.
///
/// Reports without an iterations section yield [`Verdict::no_match`]. A
/// syntax error stops the scan; whatever was accumulated before it stands.
pub fn extract_verdict(report: &str) -> Verdict {
    let mut reader = Reader::from_str(report);
    reader.config_mut().trim_text(true);

    let mut saw_iterations = false;
    let mut current: Option<Field> = None;
    let mut acc = Accumulator::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                if name.as_ref() == ITERATIONS {
                    saw_iterations = true;
                }
                current = Field::from_name(name.as_ref());
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == ITERATIONS {
                    saw_iterations = true;
                }
                current = None;
            }
            Ok(Event::Text(t)) => {
                if let Some(field) = current {
                    match t.unescape() {
                        Ok(text) => acc.record(field, &text),
                        Err(e) => debug!("Ignoring undecodable text in report: {}", e),
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Malformed report at byte {}: {}; keeping hits read so far",
                    reader.buffer_position(),
                    e
                );
                break;
            }
        }
    }

    if !saw_iterations {
        return Verdict::no_match();
    }
    acc.into_verdict()
}
