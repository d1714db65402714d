//! History command handler.

use crate::history::HistoryStore;
use clap::{Args, Subcommand};
use pulsepoint_core::{config::AppConfig, AppResult};

/// Show or clear past questions
#[derive(Args, Debug)]
pub struct HistoryCommand {
    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List past questions, newest last
    List {
        /// Show only the most recent N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all recorded history
    Clear,
}

impl HistoryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = HistoryStore::new(&config.workspace);

        match &self.action {
            HistoryAction::List { limit, json } => {
                let mut entries = store.list()?;
                if let Some(limit) = limit {
                    let skip = entries.len().saturating_sub(*limit);
                    entries.drain(..skip);
                }

                if *json {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                } else if entries.is_empty() {
                    println!("No history yet ({})", store.path().display());
                } else {
                    for entry in &entries {
                        println!(
                            "[{}] ({:?}) {}",
                            entry.asked_at.format("%Y-%m-%d %H:%M"),
                            entry.outcome,
                            entry.query
                        );
                    }
                }
            }
            HistoryAction::Clear => {
                store.clear()?;
                println!("History cleared ({})", store.path().display());
            }
        }

        Ok(())
    }
}
