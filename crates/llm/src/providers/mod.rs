//! LLM provider implementations.

pub mod groq;
pub mod ollama;

pub use groq::GroqClient;
pub use ollama::OllamaClient;

use pulsepoint_core::{AppError, AppResult};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

/// Maximum attempts for a completion request
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 250;

/// Whether an HTTP status is worth retrying.
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Send a request with exponential backoff on transport errors, 429 and 5xx.
///
/// `build` is called once per attempt since a `RequestBuilder` is consumed
/// by `send`. Exhausted retries and non-retryable statuses surface as
/// `AppError::Generation`.
pub(crate) async fn send_with_retries<F>(service: &str, build: F) -> AppResult<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                let error = AppError::Generation(format!(
                    "{} API error ({}): {}",
                    service, status, body
                ));
                if !is_retryable(status) {
                    return Err(error);
                }
                error
            }
            Err(e) => AppError::Generation(format!("Failed to send request to {}: {}", service, e)),
        };

        if attempt >= MAX_RETRIES {
            return Err(error);
        }

        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1);
        warn!(
            "{} request failed (attempt {}/{}), retrying in {}ms: {}",
            service, attempt, MAX_RETRIES, backoff_ms, error
        );
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
    }
}
