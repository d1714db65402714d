//! Embedding configuration types.

use pulsepoint_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Embedding configuration (the `knowledge.embedding` section).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier (provider-specific)
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Texts per embedding request during index builds
    #[serde(rename = "batchSize", default = "default_batch_size")]
    pub batch_size: usize,

    /// Provider endpoint override (ollama)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_provider() -> String {
    "trigram".to_string()
}

fn default_model() -> String {
    "trigram-v1".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_batch_size() -> usize {
    64
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    /// Identity of the embedding function, stamped into every index.
    ///
    /// Two configs with the same version produce comparable vectors.
    pub fn version(&self) -> String {
        format!("{}/{}/{}", self.provider, self.model, self.dimensions)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batchSize must be greater than 0".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::Config("Embedding model cannot be empty".to_string()));
        }
        Ok(())
    }
}
