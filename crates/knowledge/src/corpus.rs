//! Corpus loading.
//!
//! Accepts `{"threads": [...]}` (the scraper's dataset shape, other keys
//! ignored) or a bare JSON array of threads.

use crate::types::{CorpusStats, Thread};
use pulsepoint_core::{AppError, AppResult};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Dataset { threads: Vec<Thread> },
    Bare(Vec<Thread>),
}

/// Load and validate threads from a JSON corpus file.
pub fn load_threads(path: &Path) -> AppResult<Vec<Thread>> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Corpus file not found: {:?}",
            path
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    let threads = parse_threads(&contents)
        .map_err(|e| AppError::Serialization(format!("Failed to parse corpus {:?}: {}", path, e)))?;

    tracing::info!("Loaded {} threads from {:?}", threads.len(), path);
    Ok(threads)
}

/// Parse threads from JSON text, deriving missing source labels.
pub fn parse_threads(json: &str) -> AppResult<Vec<Thread>> {
    let parsed: CorpusFile = serde_json::from_str(json)?;
    let mut threads = match parsed {
        CorpusFile::Dataset { threads } => threads,
        CorpusFile::Bare(threads) => threads,
    };

    let mut seen = HashSet::new();
    for thread in &mut threads {
        if thread.thread_id.trim().is_empty() {
            return Err(AppError::Serialization(
                "Thread with empty thread_id".to_string(),
            ));
        }
        if !seen.insert(thread.thread_id.clone()) {
            return Err(AppError::Serialization(format!(
                "Duplicate thread_id: {}",
                thread.thread_id
            )));
        }
        if thread.source_label.is_empty() {
            thread.source_label = derive_source_label(thread);
        }
    }

    Ok(threads)
}

fn derive_source_label(thread: &Thread) -> String {
    match thread.subreddit.as_deref() {
        Some(sub) if !sub.is_empty() => {
            format!("r/{} - {}", sub.trim_start_matches("r/"), thread.thread_id)
        }
        _ => thread.thread_id.clone(),
    }
}

/// Summarize a loaded corpus.
pub fn corpus_stats(threads: &[Thread]) -> CorpusStats {
    let comment_count: usize = threads.iter().map(|t| t.comments.len()).sum();

    let communities: BTreeSet<String> = threads
        .iter()
        .filter_map(|t| match t.subreddit.as_deref() {
            Some(sub) if !sub.is_empty() => Some(sub.to_string()),
            _ => t
                .source_label
                .split_once(" - ")
                .map(|(community, _)| community.trim_start_matches("r/").to_string()),
        })
        .collect();

    CorpusStats {
        thread_count: threads.len(),
        comment_count,
        avg_comments_per_thread: if threads.is_empty() {
            0.0
        } else {
            comment_count as f64 / threads.len() as f64
        },
        communities: communities.into_iter().collect(),
    }
}
