//! Error types for PulsePoint.
//!
//! One enum covers every stage of the pipeline so callers can tell a
//! configuration problem apart from an index or model failure. A safety
//! gate refusal is not an error and never appears here.

use thiserror::Error;

/// Unified error type for PulsePoint.
///
/// All fallible functions return `Result<T, AppError>`. The variant names
/// the stage that failed; the message carries the detail.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration, including absent credentials.
    /// Fatal at startup, never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persisted index is missing, corrupt, or was built with a
    /// different embedding function.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// Embedding the query or reading the vector store failed.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// The language model call failed or returned unusable output.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Prompt definition or template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_stage() {
        let err = AppError::IndexUnavailable("missing file".to_string());
        assert_eq!(err.to_string(), "Index unavailable: missing file");

        let err = AppError::Generation("timeout".to_string());
        assert!(err.to_string().starts_with("Generation error"));
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
