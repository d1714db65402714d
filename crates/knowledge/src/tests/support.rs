//! Shared fixtures: a small corpus and counting stubs.

use crate::config::KnowledgeBaseConfig;
use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::types::{Comment, Thread};
use pulsepoint_core::{AppError, AppResult};
use pulsepoint_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const DIMENSIONS: usize = 128;

pub fn test_config() -> KnowledgeBaseConfig {
    let mut config = KnowledgeBaseConfig {
        chunk_size: 200,
        chunk_overlap: 20,
        ..Default::default()
    };
    config.embedding.dimensions = DIMENSIONS;
    config.embedding.batch_size = 4;
    config
}

fn comment(text: &str, score: i64) -> Comment {
    Comment {
        author: "peer".to_string(),
        text: text.to_string(),
        rank_score: score,
    }
}

pub fn corpus() -> Vec<Thread> {
    vec![
        Thread {
            thread_id: "mig001".to_string(),
            source_label: "r/migraine - mig001".to_string(),
            title: "What actually helps your migraines?".to_string(),
            post_text: "My migraines last two days. Looking for migraine relief that worked for others."
                .to_string(),
            comments: vec![
                comment("Lying in a dark quiet room with an ice pack on my neck gives me migraine relief.", 41),
                comment("Daily magnesium cut my migraine frequency in half after a few months.", 27),
                comment("Tracking triggers like skipped meals and poor sleep helped me avoid migraines.", 12),
            ],
            subreddit: Some("migraine".to_string()),
        },
        Thread {
            thread_id: "ecz002".to_string(),
            source_label: "r/eczema - ecz002".to_string(),
            title: "Eczema on hands every winter".to_string(),
            post_text: "Hands crack and itch whenever it gets cold. What moisturizer works?".to_string(),
            comments: vec![
                comment("Thick ointment at night under cotton gloves changed everything for my eczema.", 30),
                comment("Switching to fragrance free soap reduced the itching.", 8),
            ],
            subreddit: Some("eczema".to_string()),
        },
        Thread {
            thread_id: "ibs003".to_string(),
            source_label: "r/ibs - ibs003".to_string(),
            title: "Low FODMAP diet experiences".to_string(),
            post_text: "Thinking about trying low FODMAP for bloating. Did it work for anyone?".to_string(),
            comments: vec![comment(
                "The elimination phase was tough but bloating improved within three weeks.",
                19,
            )],
            subreddit: Some("ibs".to_string()),
        },
    ]
}

/// Trigram embeddings that count every batch call.
#[derive(Debug)]
pub struct CountingEmbedder {
    inner: TrigramProvider,
    pub calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: TrigramProvider::new(DIMENSIONS),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

/// Language model stub with a fixed reply.
pub struct CountingLlm {
    reply: String,
    pub calls: AtomicUsize,
}

impl CountingLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for CountingLlm {
    fn provider_name(&self) -> &str {
        "counting"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LlmResponse {
            content: self.reply.clone(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// Language model stub whose every call fails.
pub struct FailingLlm;

#[async_trait::async_trait]
impl LlmClient for FailingLlm {
    fn provider_name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        Err(AppError::Generation(
            "groq request failed with status 503".to_string(),
        ))
    }
}
