//! PulsePoint Core Library
//!
//! Foundational utilities shared by every PulsePoint crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Credential lookup

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use credentials::{ChainedCredentialProvider, CredentialProvider};
pub use error::{AppError, AppResult};
