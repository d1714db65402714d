//! Build determinism, chunk invariants and persisted-index checks.

use super::support::{corpus, test_config, CountingEmbedder, DIMENSIONS};
use crate::build::build_index;
use crate::chunk::chunk;
use crate::index::{load_index, VectorIndex};
use crate::normalize::normalize;
use crate::retrieve::retrieve;
use pulsepoint_core::AppError;
use tempfile::TempDir;

#[tokio::test]
async fn test_rebuild_is_bit_identical() {
    let temp = TempDir::new().unwrap();
    let config = test_config();
    let first_path = temp.path().join("first.sqlite");
    let second_path = temp.path().join("second.sqlite");

    let first = build_index(&corpus(), &config, &CountingEmbedder::new(), &first_path)
        .await
        .unwrap();

    // Input order must not matter
    let mut reversed = corpus();
    reversed.reverse();
    let second = build_index(&reversed, &config, &CountingEmbedder::new(), &second_path)
        .await
        .unwrap();

    assert_eq!(first.content_hash, second.content_hash);
    assert_eq!(first.chunk_count, second.chunk_count);

    let (_, a) = load_index(&first_path, &config.embedding.version()).unwrap();
    let (_, b) = load_index(&second_path, &config.embedding.version()).unwrap();
    assert_eq!(a.entries(), b.entries());
}

#[tokio::test]
async fn test_rebuild_replaces_previous_index() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("index.sqlite");
    let config = test_config();

    build_index(&corpus(), &config, &CountingEmbedder::new(), &path)
        .await
        .unwrap();
    let smaller: Vec<_> = corpus().into_iter().take(1).collect();
    let stats = build_index(&smaller, &config, &CountingEmbedder::new(), &path)
        .await
        .unwrap();

    let (manifest, index) = load_index(&path, &config.embedding.version()).unwrap();
    assert_eq!(manifest.thread_count, 1);
    assert_eq!(index.len(), stats.chunk_count);
    assert!(index
        .entries()
        .iter()
        .all(|e| e.chunk.metadata.thread_id == "mig001"));
}

#[tokio::test]
async fn test_persisted_index_retrieves_like_fresh_one() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("index.sqlite");
    let config = test_config();
    let embedder = CountingEmbedder::new();

    build_index(&corpus(), &config, &embedder, &path).await.unwrap();
    let (manifest, index) = load_index(&path, &config.embedding.version()).unwrap();
    assert_eq!(manifest.dimensions, DIMENSIONS);

    let results = retrieve(&index, &embedder, "fragrance free soap for itching", 2)
        .await
        .unwrap();
    assert_eq!(results[0].entry.chunk.metadata.thread_id, "ecz002");
}

#[tokio::test]
async fn test_version_mismatch_is_refused() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("index.sqlite");
    let config = test_config();

    build_index(&corpus(), &config, &CountingEmbedder::new(), &path)
        .await
        .unwrap();

    let result = load_index(&path, "ollama/nomic-embed-text/768");
    match result {
        Err(AppError::IndexUnavailable(msg)) => assert!(msg.contains("Rebuild")),
        Err(other) => panic!("expected IndexUnavailable, got {}", other),
        Ok(_) => panic!("expected IndexUnavailable"),
    }
}

#[test]
fn test_corpus_chunks_respect_bounds_and_reconstruct() {
    let config = test_config();

    for thread in corpus() {
        let document = normalize(&thread);
        let chunks = chunk(&document, config.chunk_size, config.chunk_overlap).unwrap();
        assert!(!chunks.is_empty());

        let mut rebuilt = String::new();
        for (i, c) in chunks.iter().enumerate() {
            assert!(
                c.text.chars().count() <= config.chunk_size,
                "Chunk {} of {} exceeds max size",
                i,
                thread.thread_id
            );
            assert_eq!(c.position as usize, i);
            assert_eq!(c.metadata, document.metadata);

            if i == 0 {
                rebuilt.push_str(&c.text);
            } else {
                rebuilt.extend(c.text.chars().skip(config.chunk_overlap));
            }
        }
        assert_eq!(rebuilt, document.text, "Chunks must reconstruct {}", thread.thread_id);
    }
}
