//! Query-time retrieval.

use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::types::RetrievalResult;
use pulsepoint_core::{AppError, AppResult};

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 4;

/// Embed `query` and return the `k` most similar chunks.
///
/// An empty index returns no results without calling the provider.
pub async fn retrieve(
    index: &dyn VectorIndex,
    provider: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> AppResult<RetrievalResult> {
    if index.is_empty() || k == 0 {
        tracing::debug!("Skipping retrieval: index empty or k = 0");
        return Ok(Vec::new());
    }

    let query_vector = provider.embed(query).await.map_err(|e| match e {
        AppError::Retrieval(_) => e,
        other => AppError::Retrieval(format!("Failed to embed query: {}", other)),
    })?;

    let results = index.search(&query_vector, k)?;

    if let Some(top) = results.first() {
        tracing::info!(
            "Retrieved {} chunks (top score: {:.3}, lowest: {:.3})",
            results.len(),
            top.score,
            results.last().map(|r| r.score).unwrap_or(top.score)
        );
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::index::MemoryIndex;
    use crate::types::{Chunk, DocumentMetadata, IndexEntry};

    #[derive(Debug)]
    struct FailingProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for FailingProvider {
        fn provider_name(&self) -> &str {
            "failing"
        }

        fn model_name(&self) -> &str {
            "none"
        }

        fn dimensions(&self) -> usize {
            8
        }

        async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Err(AppError::Other("connection refused".to_string()))
        }
    }

    async fn build(texts: &[(&str, &str)], provider: &TrigramProvider) -> MemoryIndex {
        let mut entries = Vec::new();
        for (thread_id, text) in texts {
            entries.push(IndexEntry {
                vector: provider.embed(text).await.unwrap(),
                chunk: Chunk {
                    text: text.to_string(),
                    metadata: DocumentMetadata {
                        thread_id: thread_id.to_string(),
                        source_label: format!("r/test - {}", thread_id),
                        title: thread_id.to_string(),
                    },
                    position: 0,
                },
            });
        }
        MemoryIndex::new(entries, provider.dimensions()).unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_ranks_matching_text_first() {
        let provider = TrigramProvider::new(256);
        let index = build(
            &[
                ("eczema", "Eczema flares calmed with oatmeal baths and thick moisturizer"),
                ("migraine", "Migraine relief came from a dark quiet room and magnesium"),
                ("ibs", "Low FODMAP diet reduced IBS bloating for many people"),
            ],
            &provider,
        )
        .await;

        let results = retrieve(&index, &provider, "what helps migraine relief", 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.chunk.metadata.thread_id, "migraine");
    }

    #[tokio::test]
    async fn test_retrieve_is_deterministic() {
        let provider = TrigramProvider::new(128);
        let index = build(
            &[("a", "sleep hygiene tips"), ("b", "sleep schedule routine")],
            &provider,
        )
        .await;

        let first = retrieve(&index, &provider, "sleep", 2).await.unwrap();
        let second = retrieve(&index, &provider, "sleep", 2).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_index_skips_embedding() {
        let index = MemoryIndex::default();
        let results = retrieve(&index, &FailingProvider, "anything", 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_is_retrieval_error() {
        let provider = TrigramProvider::new(8);
        let index = build(&[("a", "some text here")], &provider).await;

        let err = retrieve(&index, &FailingProvider, "query", 4)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Retrieval(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
