//! Ask command handler.
//!
//! Answers one question from the peer-experience index.

use crate::history::{HistoryEntry, HistoryStore};
use clap::Args;
use pulsepoint_core::{config::AppConfig, AppError, AppResult, ChainedCredentialProvider};
use pulsepoint_knowledge::{render_citations, AskOutcome, RagEngine};

/// Ask a health question answered from peer experiences
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not record the question in history
    #[arg(long)]
    pub no_history: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let query = self.query.trim();
        if query.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let credentials = ChainedCredentialProvider::default_for(&config.workspace);
        let response =
            RagEngine::ask_in_workspace(&config.workspace, config, &credentials, query).await?;

        tracing::debug!(
            "Ask outcome: {:?}, {} citations",
            response.outcome,
            response.citations.len()
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", response.answer);
            if response.outcome != AskOutcome::SafetyTriggered {
                println!();
                println!("Sources:");
                println!("{}", render_citations(&response.citations));
            }
        }

        if !self.no_history {
            HistoryStore::new(&config.workspace).record(&HistoryEntry::new(query, &response))?;
        }

        Ok(())
    }
}
