//! Embedding generation.
//!
//! Providers sit behind [`EmbeddingProvider`]; [`create_provider`] picks one
//! from [`EmbeddingConfig`]. The config's [`EmbeddingConfig::version`] is
//! stamped into every index so queries never mix embedding functions.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
