//! Built-in prompt definitions.
//!
//! A workspace can override any of these by placing a YAML file with the
//! same id under `.pulsepoint/prompts/`.

use crate::types::{PromptBehavior, PromptContextConfig, PromptDefinition, PromptOutputSpec};

/// Id of the grounded answer prompt used by the synthesizer.
pub const GROUNDED_ANSWER_PROMPT_ID: &str = "pulsepoint.answer.grounded";

/// Variables: `fallback`, `disclaimer`.
const GROUNDED_SYSTEM: &str = "You are PulsePoint, an assistant that summarizes experiences people have \
shared in online health communities. You are not a doctor.

Follow these rules strictly:
1. Answer ONLY using the peer experiences provided in the context. Do not add outside medical knowledge.
2. If the context does not contain information relevant to the question, reply exactly: \"{{fallback}}\"
3. Mention which source threads the experiences come from, using their labels.
4. Never diagnose, prescribe, or recommend a specific treatment. Describe what peers reported trying.
5. End every answer with this sentence: \"{{disclaimer}}\"";

/// Variables: `knowledgeContext`, `question`.
const GROUNDED_TEMPLATE: &str = "Peer experiences:

{{knowledgeContext}}

Question: {{question}}

Answer:";

/// Look up a built-in prompt by id.
pub fn builtin_prompt(prompt_id: &str) -> Option<PromptDefinition> {
    match prompt_id {
        GROUNDED_ANSWER_PROMPT_ID => Some(grounded_answer()),
        _ => None,
    }
}

/// The grounded answer prompt.
pub fn grounded_answer() -> PromptDefinition {
    PromptDefinition {
        id: GROUNDED_ANSWER_PROMPT_ID.to_string(),
        title: "Grounded answer from peer experiences".to_string(),
        api_version: "1.0".to_string(),
        created_by: "pulsepoint".to_string(),
        behavior: PromptBehavior {
            tone: "empathetic".to_string(),
            style: "concise".to_string(),
        },
        context: PromptContextConfig {
            include_knowledge_base: true,
            knowledge_base_name: Some("peer-threads".to_string()),
        },
        system: Some(GROUNDED_SYSTEM.to_string()),
        template: GROUNDED_TEMPLATE.to_string(),
        output: PromptOutputSpec {
            format: "text".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin_prompt(GROUNDED_ANSWER_PROMPT_ID).is_some());
        assert!(builtin_prompt("nope").is_none());
    }

    #[test]
    fn test_grounded_answer_uses_expected_variables() {
        let def = grounded_answer();
        let system = def.system.unwrap();
        assert!(system.contains("{{fallback}}"));
        assert!(system.contains("{{disclaimer}}"));
        assert!(def.template.contains("{{knowledgeContext}}"));
        assert!(def.template.contains("{{question}}"));
    }
}
