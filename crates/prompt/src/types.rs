//! Prompt types for PulsePoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition loaded from YAML or built in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Behavioral settings
    pub behavior: PromptBehavior,

    /// Context injection settings
    #[serde(default)]
    pub context: PromptContextConfig,

    /// Optional system message template (Handlebars)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message template (Handlebars)
    pub template: String,

    /// Output specification
    pub output: PromptOutputSpec,
}

/// Behavioral settings for prompt execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBehavior {
    /// Tone (e.g., "empathetic", "neutral")
    pub tone: String,

    /// Style (e.g., "concise", "detailed")
    pub style: String,
}

/// Context injection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptContextConfig {
    /// Include retrieved knowledge as `{{knowledgeContext}}`
    #[serde(rename = "includeKnowledgeBase", default)]
    pub include_knowledge_base: bool,

    /// Optional knowledge base name
    #[serde(rename = "knowledgeBaseName", skip_serializing_if = "Option::is_none")]
    pub knowledge_base_name: Option<String>,
}

/// Output specification for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    /// Output format (e.g., "text", "markdown")
    pub format: String,
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Knowledge base used (if any)
    #[serde(rename = "knowledgeBaseUsed", skip_serializing_if = "Option::is_none")]
    pub knowledge_base_used: Option<String>,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(
        system: Option<String>,
        user: String,
        source_prompt_id: String,
        knowledge_base_used: Option<String>,
        resolved_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            system,
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                knowledge_base_used,
                resolved_variables,
            },
        }
    }
}
