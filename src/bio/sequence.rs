use serde::{Deserialize, Serialize};

/// A single query sequence as read from a FASTA-style file.
///
/// Residues are kept as text because every downstream consumer (the remote
/// service form field, the display units in the output file) wants text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: Option<String>,
    pub residues: String,
}

impl Sequence {
    pub fn new(residues: impl Into<String>) -> Self {
        Self {
            id: None,
            residues: residues.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
        self
    }

    /// Length in residues (characters, not bytes).
    pub fn len(&self) -> usize {
        self.residues.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.residues
    }

    /// Keep at most `max_len` residues. Returns true if anything was dropped.
    pub fn truncate(&mut self, max_len: usize) -> bool {
        match self.residues.char_indices().nth(max_len) {
            Some((byte_offset, _)) => {
                self.residues.truncate(byte_offset);
                true
            }
            None => false,
        }
    }

    pub fn header(&self) -> String {
        match &self.id {
            Some(id) => format!(">{}", id),
            None => ">".to_string(),
        }
    }
}
