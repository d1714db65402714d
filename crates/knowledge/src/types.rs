//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One forum discussion: an original post plus its ranked replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Stable identifier, unique within a corpus
    pub thread_id: String,

    /// Human-readable origin, e.g. "r/migraine - abc123"
    #[serde(default)]
    pub source_label: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub post_text: String,

    /// Replies in corpus order; never re-sorted
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Community name from the raw dataset (used to derive `source_label`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
}

/// A reply within a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,

    /// Community score of the reply
    #[serde(default, alias = "score")]
    pub rank_score: i64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Provenance carried from a thread onto every chunk derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub thread_id: String,
    pub source_label: String,
    pub title: String,
}

/// A thread flattened into one retrievable text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// A bounded segment of a document, the unit that is embedded and retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,

    /// Copied verbatim from the parent document
    pub metadata: DocumentMetadata,

    /// 0-based ordinal within the parent document
    pub position: u32,
}

/// A chunk paired with its embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// An index entry with its similarity to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: IndexEntry,
    pub score: f32,
}

/// Ranked retrieval output, descending similarity, at most `k` long.
pub type RetrievalResult = Vec<ScoredEntry>;

/// Description of a persisted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Embedding function identity, `provider/model/dimensions`
    pub embedding_version: String,

    pub dimensions: usize,

    pub entry_count: usize,

    pub thread_count: usize,

    /// SHA-256 over entry texts and vectors, hex encoded
    pub content_hash: String,

    pub built_at: DateTime<Utc>,
}

/// Statistics from an index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStats {
    pub thread_count: usize,

    pub chunk_count: usize,

    /// Threads whose normalized text was empty and produced no chunks
    pub skipped_threads: usize,

    pub content_hash: String,

    pub duration_secs: f64,
}

/// Corpus-level statistics for the `stats` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    pub thread_count: usize,

    pub comment_count: usize,

    pub avg_comments_per_thread: f64,

    /// Distinct source communities, sorted
    pub communities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_accepts_score_alias() {
        let comment: Comment =
            serde_json::from_str(r#"{"author": "a", "text": "t", "score": 12}"#).unwrap();
        assert_eq!(comment.rank_score, 12);
    }

    #[test]
    fn test_missing_and_null_fields_are_empty() {
        let thread: Thread =
            serde_json::from_str(r#"{"thread_id": "t1", "title": null}"#).unwrap();
        assert_eq!(thread.title, "");
        assert_eq!(thread.post_text, "");
        assert!(thread.comments.is_empty());
    }
}
