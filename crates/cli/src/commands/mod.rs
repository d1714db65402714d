//! Command handlers for the PulsePoint CLI.

pub mod ask;
pub mod history;
pub mod index;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use history::HistoryCommand;
pub use index::IndexCommand;
pub use stats::StatsCommand;
