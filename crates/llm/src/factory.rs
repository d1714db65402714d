//! LLM provider factory.
//!
//! Resolves a provider name to a client implementation. Secrets are
//! resolved by the caller (see `pulsepoint_core::credentials`) and passed in.

use crate::client::LlmClient;
use crate::providers::{groq::DEFAULT_GROQ_URL, ollama::DEFAULT_OLLAMA_URL, GroqClient, OllamaClient};
use pulsepoint_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by "groq"
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "groq" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("Groq provider requires API key (GROQ_API_KEY)".to_string())
            })?;
            let client = GroqClient::with_base_url(endpoint.unwrap_or(DEFAULT_GROQ_URL), key)?;
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = OllamaClient::with_base_url(endpoint.unwrap_or(DEFAULT_OLLAMA_URL))?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_groq_requires_api_key() {
        match create_client("groq", None, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("GROQ_API_KEY")),
            Err(other) => panic!("Expected config error, got {}", other),
            Ok(_) => panic!("Expected error for Groq without API key"),
        }
    }

    #[test]
    fn test_create_groq_client() {
        let client = create_client("Groq", None, Some("gsk-test")).unwrap();
        assert_eq!(client.provider_name(), "groq");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
