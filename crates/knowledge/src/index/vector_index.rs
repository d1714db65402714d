//! Vector index abstraction and the in-memory backend.

use crate::types::{IndexEntry, ScoredEntry};
use pulsepoint_core::{AppError, AppResult};

/// Trait for vector index backends.
///
/// Indexes are read-only once built; a rebuild replaces them wholesale.
pub trait VectorIndex: Send + Sync {
    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Search for the `top_k` entries most similar to `query`.
    ///
    /// Results are ordered by descending cosine similarity; entries with
    /// equal scores keep their insertion order.
    fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<ScoredEntry>>;
}

/// Brute-force in-memory index. Entries are kept in build order.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl MemoryIndex {
    /// Build an index from entries, rejecting vectors of the wrong length.
    pub fn new(entries: Vec<IndexEntry>, dimensions: usize) -> AppResult<Self> {
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimensions) {
            return Err(AppError::IndexUnavailable(format!(
                "Entry {}#{} has {} dimensions, expected {}",
                bad.chunk.metadata.thread_id,
                bad.chunk.position,
                bad.vector.len(),
                dimensions
            )));
        }
        Ok(Self {
            entries,
            dimensions,
        })
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl VectorIndex for MemoryIndex {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<ScoredEntry>> {
        if self.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(AppError::Retrieval(format!(
                "Query vector has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<ScoredEntry> = self
            .entries
            .iter()
            .map(|entry| ScoredEntry {
                score: cosine_similarity(query, &entry.vector),
                entry: entry.clone(),
            })
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);

        tracing::debug!(
            "Retrieved {} entries (requested top-{})",
            scored.len(),
            top_k
        );

        Ok(scored)
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Zero vectors have similarity 0 with everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
