//! Retrieval-augmented answering over peer threads.

pub mod engine;
pub mod synthesize;
pub mod types;

pub use engine::RagEngine;
pub use synthesize::{build_context, collect_citations, Synthesizer, DISCLAIMER, FALLBACK};
pub use types::{render_citations, AskOutcome, AskResponse, Citation};
