//! Peer-experience knowledge base.
//!
//! Offline: threads are normalized, chunked, embedded and persisted to a
//! SQLite index ([`build_index`]). Online: [`RagEngine::ask`] runs the safety
//! gate, retrieves the closest chunks and asks the language model for a
//! grounded answer with citations.

pub mod build;
pub mod chunk;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod index;
pub mod normalize;
pub mod progress;
pub mod rag;
pub mod retrieve;
pub mod safety;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use build::{build_index, build_index_with_progress};
pub use config::{load_config, KnowledgeBaseConfig};
pub use corpus::{corpus_stats, load_threads, parse_threads};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::{load_index, read_manifest, MemoryIndex, VectorIndex};
pub use progress::{ProgressEvent, ProgressReporter};
pub use rag::{render_citations, AskOutcome, AskResponse, Citation, RagEngine};
pub use retrieve::retrieve;
pub use safety::{SafetyGate, SafetyVerdict, CRISIS_MESSAGE};
pub use types::{
    BuildStats, Chunk, Comment, CorpusStats, Document, DocumentMetadata, IndexEntry,
    IndexManifest, RetrievalResult, ScoredEntry, Thread,
};
