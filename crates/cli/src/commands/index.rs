//! Index command handler.
//!
//! Builds the embedding index from the thread corpus.

use clap::{Args, Subcommand};
use pulsepoint_core::{config::AppConfig, AppResult};
use pulsepoint_knowledge::{
    build_index_with_progress, create_provider, load_config, load_threads, ProgressEvent,
    ProgressReporter,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Manage the embedding index
#[derive(Args, Debug)]
pub struct IndexCommand {
    #[command(subcommand)]
    pub action: IndexAction,
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Build (or rebuild) the index from the corpus
    Build(IndexBuildCommand),
}

#[derive(Args, Debug)]
pub struct IndexBuildCommand {
    /// Corpus JSON file (default: knowledge.corpusPath from config)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexBuildCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index build command");

        let knowledge = load_config(&config.config_path())?;
        let corpus_path = self
            .corpus
            .clone()
            .unwrap_or_else(|| knowledge.corpus_path(&config.workspace));
        let index_path = knowledge.index_path(&config.workspace);

        let threads = load_threads(&corpus_path)?;
        let provider = create_provider(&knowledge.embedding)?;

        let progress = if self.quiet || self.json {
            ProgressReporter::noop()
        } else {
            ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple())
            }))
        };

        let stats = build_index_with_progress(
            &threads,
            &knowledge,
            provider.as_ref(),
            &index_path,
            &progress,
        )
        .await?;

        if self.json {
            let output = serde_json::json!({
                "index": index_path,
                "embedding": provider.version(),
                "threadCount": stats.thread_count,
                "chunkCount": stats.chunk_count,
                "skippedThreads": stats.skipped_threads,
                "contentHash": stats.content_hash,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Indexed {} threads ({} chunks) in {:.2}s",
                stats.thread_count, stats.chunk_count, stats.duration_secs
            );
            println!("  Index: {}", index_path.display());
            println!("  Content hash: {}", stats.content_hash);
        }

        Ok(())
    }
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            IndexAction::Build(cmd) => cmd.execute(config).await,
        }
    }
}
