//! Prompt system for PulsePoint.
//!
//! Structured prompt management with:
//! - YAML-based prompt definitions, overridable per workspace
//! - A built-in grounded-answer prompt
//! - Handlebars template rendering
//! - Knowledge context injection

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::GROUNDED_ANSWER_PROMPT_ID;
pub use loader::{load_prompt, resolve_prompt};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptContextConfig, PromptDefinition,
    PromptOutputSpec,
};
