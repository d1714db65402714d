//! Stats command handler.
//!
//! Summarizes the corpus and the built index.

use clap::Args;
use pulsepoint_core::{config::AppConfig, AppResult};
use pulsepoint_knowledge::{corpus_stats, load_config, load_threads, read_manifest};

/// Show corpus and index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let knowledge = load_config(&config.config_path())?;
        let corpus_path = knowledge.corpus_path(&config.workspace);
        let index_path = knowledge.index_path(&config.workspace);

        let corpus = if corpus_path.exists() {
            Some(corpus_stats(&load_threads(&corpus_path)?))
        } else {
            tracing::warn!("No corpus at {:?}", corpus_path);
            None
        };

        let manifest = if index_path.exists() {
            Some(read_manifest(&index_path)?)
        } else {
            None
        };

        if self.json {
            let output = serde_json::json!({
                "corpus": corpus,
                "index": manifest,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        match &corpus {
            Some(stats) => {
                println!("Corpus: {}", corpus_path.display());
                println!("  Threads: {}", stats.thread_count);
                println!("  Comments: {}", stats.comment_count);
                println!(
                    "  Avg comments per thread: {:.1}",
                    stats.avg_comments_per_thread
                );
                println!("  Communities: {}", stats.communities.join(", "));
            }
            None => println!("Corpus: not found ({})", corpus_path.display()),
        }

        match &manifest {
            Some(manifest) => {
                println!("Index: {}", index_path.display());
                println!("  Entries: {}", manifest.entry_count);
                println!("  Threads: {}", manifest.thread_count);
                println!("  Embedding: {}", manifest.embedding_version);
                println!("  Built: {}", manifest.built_at.to_rfc3339());
            }
            None => println!("Index: not built. Run 'pulsepoint index build'."),
        }

        Ok(())
    }
}
