//! Prompt builder for rendering templates and injecting context.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use pulsepoint_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Injects the knowledge context as `knowledgeContext` when the definition
/// asks for it, then renders the system and user templates.
///
/// # Example
/// ```no_run
/// use pulsepoint_prompt::{build_prompt, builtin::grounded_answer};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What helped with migraines?".to_string());
///
/// let built = build_prompt(&grounded_answer(), vars, Some("...".to_string()))?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    mut variables: HashMap<String, String>,
    knowledge_context: Option<String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let knowledge_base_used = if definition.context.include_knowledge_base {
        if let Some(kb_ctx) = knowledge_context {
            variables.insert("knowledgeContext".to_string(), kb_ctx);
            definition.context.knowledge_base_name.clone()
        } else {
            tracing::warn!("Knowledge base context requested but not provided");
            None
        }
    } else {
        None
    };

    let mut handlebars = Handlebars::new();
    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(&mut handlebars, "system", template, &variables))
        .transpose()?;
    let user = render_template(&mut handlebars, "user", &definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        knowledge_base_used,
        variables,
    ))
}

fn render_template(
    handlebars: &mut Handlebars<'_>,
    name: &str,
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    handlebars
        .register_template_string(name, template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render(name, variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
