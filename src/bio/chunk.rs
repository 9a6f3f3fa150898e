//! Fixed-size splitting of query sequences.
//!
//! The same rule serves two purposes: cutting the query into units for
//! remote submission and cutting each submitted unit into display rows.

use crate::{BlastScanError, Result};
use std::iter::FusedIterator;

/// Default number of residues submitted per remote job.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Chunker {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(BlastScanError::InvalidInput(
                "chunk size must be positive".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Iterate over contiguous pieces of `text`, left to right.
    ///
    /// Every piece holds `chunk_size` characters except possibly the last.
    /// The iterator is `Clone`, so a split can be replayed from the start.
    pub fn split<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            remaining: text,
            chunk_size: self.chunk_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    remaining: &'a str,
    chunk_size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let end = self
            .remaining
            .char_indices()
            .nth(self.chunk_size)
            .map(|(offset, _)| offset)
            .unwrap_or(self.remaining.len());
        let (head, tail) = self.remaining.split_at(end);
        self.remaining = tail;
        Some(head)
    }
}

impl FusedIterator for Chunks<'_> {}

/// Owned convenience wrapper around [`Chunker::split`].
pub fn split_sequence(text: &str, chunk_size: usize) -> Result<Vec<String>> {
    let chunker = Chunker::new(chunk_size)?;
    Ok(chunker.split(text).map(str::to_string).collect())
}
