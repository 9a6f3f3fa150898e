pub mod chunk;
pub mod fasta;
pub mod sequence;

pub use chunk::{split_sequence, Chunker, Chunks};
pub use fasta::{load_sequence, parse_sequence_text};
pub use sequence::Sequence;
