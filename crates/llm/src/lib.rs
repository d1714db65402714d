//! LLM integration crate for PulsePoint.
//!
//! A provider-agnostic completion interface with two backends:
//! - **Groq**: hosted OpenAI-compatible API (default)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use pulsepoint_llm::{create_client, LlmRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("ollama", None, None)?;
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GroqClient, OllamaClient};
