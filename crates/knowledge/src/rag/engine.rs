//! Query pipeline: safety gate, retrieval, synthesis.

use crate::config::{load_config, KnowledgeBaseConfig};
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::index::{load_index, VectorIndex};
use crate::rag::synthesize::{SynthesisSettings, Synthesizer, FALLBACK};
use crate::rag::types::AskResponse;
use crate::retrieve::retrieve;
use crate::safety::{SafetyGate, SafetyVerdict};
use pulsepoint_core::{AppConfig, AppResult, CredentialProvider};
use pulsepoint_llm::{create_client, LlmClient};
use pulsepoint_prompt::{resolve_prompt, PromptDefinition, GROUNDED_ANSWER_PROMPT_ID};
use std::path::Path;
use std::sync::Arc;

/// Answers questions over a loaded index.
///
/// Holds only immutable state, so one engine can serve concurrent calls.
pub struct RagEngine {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    synthesizer: Synthesizer,
    gate: SafetyGate,
    top_k: usize,
}

impl RagEngine {
    /// Assemble an engine from already-constructed parts.
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
        config: &KnowledgeBaseConfig,
        model: &str,
    ) -> Self {
        let settings = SynthesisSettings {
            model: model.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_context_chars: config.max_context_chars,
        };

        Self {
            index,
            embedder,
            synthesizer: Synthesizer::new(llm, prompt, settings),
            gate: SafetyGate::new(&config.safety_phrases),
            top_k: config.top_k,
        }
    }

    /// Wire an engine from workspace configuration.
    ///
    /// Fails with `Config` when settings or credentials are missing and with
    /// `IndexUnavailable` when the index cannot be loaded.
    pub fn open(
        workspace: &Path,
        config: &AppConfig,
        credentials: &dyn CredentialProvider,
    ) -> AppResult<Self> {
        config.validate()?;
        let knowledge = load_config(&config.config_path())?;

        let api_key = config.resolve_api_key(credentials)?;
        let endpoint = config.endpoint();
        let llm = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())?;

        let embedder = create_provider(&knowledge.embedding)?;
        let (manifest, index) =
            load_index(&knowledge.index_path(workspace), &embedder.version())?;

        let prompt = resolve_prompt(workspace, GROUNDED_ANSWER_PROMPT_ID)?;

        tracing::info!(
            "Engine ready: {} entries from {} threads, llm {}/{}",
            manifest.entry_count,
            manifest.thread_count,
            config.provider,
            config.model
        );

        Ok(Self::new(
            Arc::new(index),
            embedder,
            llm,
            prompt,
            &knowledge,
            &config.model,
        ))
    }

    /// Answer one question against the workspace index.
    ///
    /// The safety gate runs before credentials, the index or the prompt are
    /// loaded, so a missing key or index cannot hide the crisis message.
    pub async fn ask_in_workspace(
        workspace: &Path,
        config: &AppConfig,
        credentials: &dyn CredentialProvider,
        query: &str,
    ) -> AppResult<AskResponse> {
        let gate = match load_config(&config.config_path()) {
            Ok(knowledge) => SafetyGate::new(&knowledge.safety_phrases),
            Err(e) => {
                tracing::warn!("Using default safety phrases: {}", e);
                SafetyGate::default()
            }
        };
        if let SafetyVerdict::Unsafe { message } = gate.check(query) {
            return Ok(AskResponse::safety_triggered(message));
        }

        let engine = Self::open(workspace, config, credentials)?;
        engine.ask(query).await
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Answer one question.
    ///
    /// Unsafe queries return the crisis message before any embedding or
    /// model call. Nothing is kept between calls.
    pub async fn ask(&self, query: &str) -> AppResult<AskResponse> {
        if let SafetyVerdict::Unsafe { message } = self.gate.check(query) {
            return Ok(AskResponse::safety_triggered(message));
        }

        if query.trim().is_empty() {
            tracing::debug!("Blank query, returning fallback answer");
            return Ok(AskResponse::no_information(FALLBACK));
        }

        let results = retrieve(
            self.index.as_ref(),
            self.embedder.as_ref(),
            query,
            self.top_k,
        )
        .await?;

        if results.is_empty() {
            return Ok(AskResponse::no_information(FALLBACK));
        }

        let (answer, citations) = self.synthesizer.synthesize(query, &results).await?;
        Ok(AskResponse::answered(answer, citations))
    }
}
