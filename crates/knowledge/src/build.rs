//! Offline index build: normalize, chunk, embed, persist.

use crate::chunk::chunk;
use crate::config::KnowledgeBaseConfig;
use crate::embeddings::EmbeddingProvider;
use crate::index::{content_hash, save_index};
use crate::normalize::normalize;
use crate::progress::ProgressReporter;
use crate::types::{BuildStats, Chunk, IndexEntry, IndexManifest, Thread};
use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use pulsepoint_core::{AppError, AppResult};
use std::path::Path;
use std::time::Instant;

/// Build the index for `threads` and write it to `path`.
pub async fn build_index(
    threads: &[Thread],
    config: &KnowledgeBaseConfig,
    provider: &dyn EmbeddingProvider,
    path: &Path,
) -> AppResult<BuildStats> {
    build_index_with_progress(threads, config, provider, path, &ProgressReporter::noop()).await
}

/// Build the index, reporting each phase through `progress`.
///
/// Entries are ordered by `(thread_id, position)` and batches are embedded
/// concurrently with order preserved, so unchanged input rebuilds to
/// identical entries and the same content hash. The previous index at
/// `path` is replaced only once the new one is fully written.
pub async fn build_index_with_progress(
    threads: &[Thread],
    config: &KnowledgeBaseConfig,
    provider: &dyn EmbeddingProvider,
    path: &Path,
    progress: &ProgressReporter,
) -> AppResult<BuildStats> {
    let start = Instant::now();
    config.validate()?;

    let version = provider.version();
    if version != config.embedding.version() {
        return Err(AppError::Config(format!(
            "Embedding provider '{}' does not match configured '{}'",
            version,
            config.embedding.version()
        )));
    }

    tracing::info!(
        "Building index from {} threads (embedding: {})",
        threads.len(),
        version
    );

    let chunks = chunk_threads(threads, config, progress)?;
    let skipped_threads = threads.len() - count_threads(&chunks);

    let vectors = embed_chunks(&chunks, config, provider, progress).await?;

    let entries: Vec<IndexEntry> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| IndexEntry { chunk, vector })
        .collect();

    let hash = content_hash(&entries);
    let manifest = IndexManifest {
        embedding_version: version,
        dimensions: provider.dimensions(),
        entry_count: entries.len(),
        thread_count: threads.len() - skipped_threads,
        content_hash: hash.clone(),
        built_at: Utc::now(),
    };

    progress.persist(entries.len() as u64, &path.display().to_string());
    save_index(path, &manifest, &entries)?;

    let duration = start.elapsed();
    tracing::info!(
        "Index build completed: {} threads, {} chunks in {:.2}s",
        manifest.thread_count,
        entries.len(),
        duration.as_secs_f64()
    );

    Ok(BuildStats {
        thread_count: manifest.thread_count,
        chunk_count: entries.len(),
        skipped_threads,
        content_hash: hash,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Normalize and chunk every thread, in thread id order.
fn chunk_threads(
    threads: &[Thread],
    config: &KnowledgeBaseConfig,
    progress: &ProgressReporter,
) -> AppResult<Vec<Chunk>> {
    let mut ordered: Vec<&Thread> = threads.iter().collect();
    ordered.sort_by(|a, b| a.thread_id.cmp(&b.thread_id));

    let total = ordered.len() as u64;
    let mut chunks = Vec::new();

    for (i, thread) in ordered.into_iter().enumerate() {
        let document = normalize(thread);
        let produced = chunk(&document, config.chunk_size, config.chunk_overlap)?;

        if produced.is_empty() {
            tracing::warn!("Thread {} produced no chunks, skipping", thread.thread_id);
        }
        chunks.extend(produced);

        progress.chunk(i as u64 + 1, total, chunks.len());
    }

    Ok(chunks)
}

fn count_threads(chunks: &[Chunk]) -> usize {
    let mut count = 0;
    let mut last: Option<&str> = None;
    for chunk in chunks {
        let id = chunk.metadata.thread_id.as_str();
        if last != Some(id) {
            count += 1;
            last = Some(id);
        }
    }
    count
}

/// Embed chunk texts in batches, returning one vector per chunk in order.
async fn embed_chunks(
    chunks: &[Chunk],
    config: &KnowledgeBaseConfig,
    provider: &dyn EmbeddingProvider,
    progress: &ProgressReporter,
) -> AppResult<Vec<Vec<f32>>> {
    let batch_size = config.embedding.batch_size;
    let total_batches = chunks.len().div_ceil(batch_size) as u64;
    let dimensions = provider.dimensions();
    let version = provider.version();

    let batches: Vec<Vec<String>> = chunks
        .chunks(batch_size)
        .map(|batch| batch.iter().map(|c| c.text.clone()).collect())
        .collect();

    let results: Vec<Vec<Vec<f32>>> = stream::iter(batches.into_iter().enumerate())
        .map(|(i, texts)| {
            let version = version.as_str();
            async move {
                let vectors = provider.embed_batch(&texts).await.map_err(|e| match e {
                    AppError::Retrieval(_) => e,
                    other => AppError::Retrieval(format!(
                        "Failed to embed batch {}: {}",
                        i + 1,
                        other
                    )),
                })?;

                if vectors.len() != texts.len() {
                    return Err(AppError::Retrieval(format!(
                        "Embedding batch {} returned {} vectors for {} texts",
                        i + 1,
                        vectors.len(),
                        texts.len()
                    )));
                }
                if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
                    return Err(AppError::Retrieval(format!(
                        "Embedding batch {} returned a {}-dimensional vector, expected {}",
                        i + 1,
                        bad.len(),
                        dimensions
                    )));
                }

                progress.embed(i as u64 + 1, total_batches, version);
                Ok(vectors)
            }
        })
        .buffered(config.build_concurrency)
        .try_collect()
        .await?;

    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::index::{load_index, read_manifest};
    use crate::types::Comment;
    use tempfile::TempDir;

    fn thread(id: &str, title: &str, post: &str) -> Thread {
        Thread {
            thread_id: id.to_string(),
            source_label: format!("r/test - {}", id),
            title: title.to_string(),
            post_text: post.to_string(),
            comments: vec![Comment {
                author: "someone".to_string(),
                text: "this worked for me".to_string(),
                rank_score: 3,
            }],
            subreddit: None,
        }
    }

    fn small_config() -> KnowledgeBaseConfig {
        let mut config = KnowledgeBaseConfig {
            chunk_size: 80,
            chunk_overlap: 10,
            ..Default::default()
        };
        config.embedding.dimensions = 64;
        config.embedding.batch_size = 3;
        config
    }

    #[tokio::test]
    async fn test_build_orders_entries_by_thread_and_position() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.sqlite");
        let config = small_config();
        let provider = TrigramProvider::new(64);

        let threads = vec![
            thread("zeta", "Later", &"long post text ".repeat(20)),
            thread("alpha", "Earlier", "short post"),
        ];

        let stats = build_index(&threads, &config, &provider, &path).await.unwrap();
        assert_eq!(stats.thread_count, 2);
        assert_eq!(stats.skipped_threads, 0);

        let (manifest, index) = load_index(&path, &config.embedding.version()).unwrap();
        assert_eq!(manifest.entry_count, stats.chunk_count);
        assert_eq!(manifest.content_hash, stats.content_hash);

        let keys: Vec<(String, u32)> = index
            .entries()
            .iter()
            .map(|e| (e.chunk.metadata.thread_id.clone(), e.chunk.position))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], ("alpha".to_string(), 0));
    }

    #[tokio::test]
    async fn test_build_rejects_mismatched_provider() {
        let temp = TempDir::new().unwrap();
        let config = small_config();
        let provider = TrigramProvider::new(32);

        let result = build_index(&[], &config, &provider, &temp.path().join("i.sqlite")).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_build_empty_corpus_writes_empty_index() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.sqlite");
        let config = small_config();
        let provider = TrigramProvider::new(64);

        let stats = build_index(&[], &config, &provider, &path).await.unwrap();
        assert_eq!(stats.chunk_count, 0);
        assert_eq!(read_manifest(&path).unwrap().entry_count, 0);
    }

    #[tokio::test]
    async fn test_build_reports_progress() {
        use std::sync::{Arc, Mutex};

        let temp = TempDir::new().unwrap();
        let config = small_config();
        let provider = TrigramProvider::new(64);
        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = phases.clone();
        let reporter = ProgressReporter::new(Arc::new(move |event: crate::progress::ProgressEvent| {
            sink.lock().unwrap().push(event.phase);
        }));

        build_index_with_progress(
            &[thread("a", "Title", "post")],
            &config,
            &provider,
            &temp.path().join("index.sqlite"),
            &reporter,
        )
        .await
        .unwrap();

        let phases = phases.lock().unwrap();
        assert_eq!(phases.first().map(String::as_str), Some("chunk"));
        assert!(phases.iter().any(|p| p == "embed"));
        assert_eq!(phases.last().map(String::as_str), Some("persist"));
    }
}
