//! Embedding index: in-memory search plus SQLite persistence.

pub mod store;
pub mod vector_index;

pub use store::{content_hash, load_index, read_manifest, save_index};
pub use vector_index::{cosine_similarity, MemoryIndex, VectorIndex};
