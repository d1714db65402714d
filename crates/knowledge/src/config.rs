//! Knowledge configuration: the `knowledge:` section of `.pulsepoint/config.yaml`.

use crate::chunk::ChunkConfig;
use crate::embeddings::EmbeddingConfig;
use crate::safety::DEFAULT_SAFETY_PHRASES;
use pulsepoint_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retrieval, chunking and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseConfig {
    /// Maximum chunk length in chars
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chars shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Case-insensitive phrases that route a query to crisis resources
    #[serde(default = "default_safety_phrases")]
    pub safety_phrases: Vec<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on the retrieved context placed in the prompt
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Embedding batches in flight during an index build
    #[serde(default = "default_build_concurrency")]
    pub build_concurrency: usize,

    /// Corpus JSON, relative to the workspace unless absolute
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    /// Index file, relative to the workspace unless absolute
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_top_k() -> usize {
    4
}

fn default_safety_phrases() -> Vec<String> {
    DEFAULT_SAFETY_PHRASES.iter().map(|s| s.to_string()).collect()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_context_chars() -> usize {
    6000
}

fn default_build_concurrency() -> usize {
    4
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("reddit_data.json")
}

fn default_index_path() -> PathBuf {
    PathBuf::from(".pulsepoint/index.sqlite")
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            embedding: EmbeddingConfig::default(),
            safety_phrases: default_safety_phrases(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_context_chars: default_max_context_chars(),
            build_concurrency: default_build_concurrency(),
            corpus_path: default_corpus_path(),
            index_path: default_index_path(),
        }
    }
}

impl KnowledgeBaseConfig {
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            max_size: self.chunk_size,
            overlap: self.chunk_overlap,
        }
    }

    /// Resolve the index file against the workspace root.
    pub fn index_path(&self, workspace: &Path) -> PathBuf {
        resolve(workspace, &self.index_path)
    }

    /// Resolve the corpus file against the workspace root.
    pub fn corpus_path(&self, workspace: &Path) -> PathBuf {
        resolve(workspace, &self.corpus_path)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.chunk_config().validate()?;
        self.embedding.validate()?;

        if self.top_k == 0 {
            return Err(AppError::Config("topK must be at least 1".to_string()));
        }
        if self.safety_phrases.iter().all(|p| p.trim().is_empty()) {
            return Err(AppError::Config(
                "safetyPhrases cannot be empty; the safety gate must stay active".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(AppError::Config("maxTokens must be at least 1".to_string()));
        }
        if self.max_context_chars == 0 {
            return Err(AppError::Config(
                "maxContextChars must be at least 1".to_string(),
            ));
        }
        if self.build_concurrency == 0 {
            return Err(AppError::Config(
                "buildConcurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

/// Load the knowledge section from a config file.
///
/// A missing file or a file without a `knowledge:` key yields defaults.
/// The result is validated.
pub fn load_config(config_path: &Path) -> AppResult<KnowledgeBaseConfig> {
    let config = if config_path.exists() {
        let content = fs::read_to_string(config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;
        parse_config(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?
    } else {
        tracing::debug!("No config file at {:?}, using knowledge defaults", config_path);
        KnowledgeBaseConfig::default()
    };

    config.validate()?;
    Ok(config)
}

fn parse_config(content: &str) -> AppResult<KnowledgeBaseConfig> {
    if content.trim().is_empty() {
        return Ok(KnowledgeBaseConfig::default());
    }

    let root: serde_yaml::Value = serde_yaml::from_str(content)?;
    match root.get("knowledge") {
        Some(section) if !section.is_null() => Ok(serde_yaml::from_value(section.clone())?),
        _ => Ok(KnowledgeBaseConfig::default()),
    }
}
