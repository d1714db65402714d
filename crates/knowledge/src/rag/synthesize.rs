//! Grounded answer synthesis.
//!
//! Builds a bounded context block from retrieved chunks, renders the
//! grounded prompt and asks the language model. Every answer that reaches
//! the caller ends with [`DISCLAIMER`].

use crate::rag::types::Citation;
use crate::types::ScoredEntry;
use pulsepoint_core::{AppError, AppResult};
use pulsepoint_llm::{LlmClient, LlmRequest};
use pulsepoint_prompt::{build_prompt, PromptDefinition};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Answer given when the context has nothing relevant.
pub const FALLBACK: &str = "I don't have information about that in the available peer experiences.";

/// Appended to every grounded answer that lacks it.
pub const DISCLAIMER: &str = "IMPORTANT: This information represents peer experiences only and is NOT medical advice. Please consult a healthcare professional for medical guidance.";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Generation parameters for the synthesizer.
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_context_chars: usize,
}

/// Turns retrieval results into an answer plus citations.
pub struct Synthesizer {
    client: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    settings: SynthesisSettings,
}

impl Synthesizer {
    pub fn new(
        client: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            client,
            prompt,
            settings,
        }
    }

    pub fn settings(&self) -> &SynthesisSettings {
        &self.settings
    }

    /// Answer `query` from `results`.
    ///
    /// Empty results return [`FALLBACK`] without calling the model.
    pub async fn synthesize(
        &self,
        query: &str,
        results: &[ScoredEntry],
    ) -> AppResult<(String, Vec<Citation>)> {
        if results.is_empty() {
            tracing::info!("No retrieved context, returning fallback answer");
            return Ok((FALLBACK.to_string(), Vec::new()));
        }

        let (context, included) = build_context(results, self.settings.max_context_chars);

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), query.to_string());
        variables.insert("fallback".to_string(), FALLBACK.to_string());
        variables.insert("disclaimer".to_string(), DISCLAIMER.to_string());

        let built = build_prompt(&self.prompt, variables, Some(context))?;

        let mut request = LlmRequest::new(built.user, &self.settings.model)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::debug!(
            "Generating answer with {} (model: {}, {} of {} chunks)",
            self.client.provider_name(),
            self.settings.model,
            included,
            results.len()
        );

        let response = self.client.complete(&request).await.map_err(|e| match e {
            AppError::Generation(_) => e,
            other => AppError::Generation(format!("LLM request failed: {}", other)),
        })?;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(AppError::Generation(
                "Language model returned an empty answer".to_string(),
            ));
        }

        Ok((
            ensure_disclaimer(answer),
            collect_citations(&results[..included]),
        ))
    }
}

/// Format ranked chunks into the prompt context, at most `max_chars` long.
///
/// Only whole chunks are added after the first; the first chunk is always
/// present and is cut to `max_chars` when it alone is too long. Returns the
/// context and how many leading results it includes.
pub fn build_context(results: &[ScoredEntry], max_chars: usize) -> (String, usize) {
    let mut context = String::new();
    let mut used = 0;

    for (i, result) in results.iter().enumerate() {
        let chunk = &result.entry.chunk;
        let block = format!(
            "Source: {} | {}\n{}",
            chunk.metadata.source_label, chunk.metadata.title, chunk.text
        );
        let block_len = block.chars().count();

        if i == 0 {
            if block_len > max_chars {
                tracing::debug!("First chunk exceeds context budget, truncating");
                return (block.chars().take(max_chars).collect(), 1);
            }
            context.push_str(&block);
            used = block_len;
            continue;
        }

        let needed = CONTEXT_SEPARATOR.chars().count() + block_len;
        if used + needed > max_chars {
            tracing::debug!(
                "Context budget reached after {} of {} chunks",
                i,
                results.len()
            );
            return (context, i);
        }
        context.push_str(CONTEXT_SEPARATOR);
        context.push_str(&block);
        used += needed;
    }

    (context, results.len())
}

/// One citation per thread, in first-seen order.
pub fn collect_citations(results: &[ScoredEntry]) -> Vec<Citation> {
    let mut seen = HashSet::new();
    results
        .iter()
        .map(|r| &r.entry.chunk.metadata)
        .filter(|m| seen.insert(m.thread_id.clone()))
        .map(|m| Citation {
            thread_id: m.thread_id.clone(),
            source_label: m.source_label.clone(),
            title: m.title.clone(),
        })
        .collect()
}

fn ensure_disclaimer(answer: &str) -> String {
    if answer.contains(DISCLAIMER) {
        answer.to_string()
    } else {
        format!("{}\n\n{}", answer, DISCLAIMER)
    }
}
