//! Document chunking.
//!
//! Two passes:
//! - [`splitter`] cuts the text into contiguous pieces no longer than
//!   `max_size - overlap`, preferring paragraph, then line, then word
//!   boundaries, then grapheme clusters.
//! - [`merging`] greedily packs pieces into chunks of at most `max_size`,
//!   each later chunk starting with the last `overlap` chars of the one
//!   before it.
//!
//! Sizes are counted in chars. Dropping the first `overlap` chars of every
//! chunk after the first and concatenating gives back the document text.

mod merging;
mod splitter;

use crate::types::{Chunk, Document};
use pulsepoint_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Chunk size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk length in chars
    pub max_size: usize,

    /// Chars carried over from the end of one chunk to the start of the next
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_size: 500,
            overlap: 50,
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.max_size == 0 {
            return Err(AppError::Config("Chunk size must be at least 1".to_string()));
        }
        if self.overlap >= self.max_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.max_size
            )));
        }
        Ok(())
    }
}

/// Split a document into overlapping chunks.
///
/// Metadata is copied to every chunk. Empty text yields no chunks.
pub fn chunk(document: &Document, max_size: usize, overlap: usize) -> AppResult<Vec<Chunk>> {
    let config = ChunkConfig { max_size, overlap };
    config.validate()?;

    if document.text.is_empty() {
        return Ok(Vec::new());
    }

    let pieces = splitter::split_pieces(&document.text, max_size - overlap);
    let texts = merging::pack_pieces(&pieces, max_size, overlap);

    tracing::trace!(
        thread_id = %document.metadata.thread_id,
        pieces = pieces.len(),
        chunks = texts.len(),
        "Chunked document"
    );

    Ok(texts
        .into_iter()
        .enumerate()
        .map(|(position, text)| Chunk {
            text,
            metadata: document.metadata.clone(),
            position: position as u32,
        })
        .collect())
}

/// Number of chars in `text`.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
