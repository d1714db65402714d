//! Session history for the CLI.
//!
//! Every answered question is appended to `.pulsepoint/history.jsonl`. The
//! pipeline never reads it; it only backs `pulsepoint history`.

use chrono::{DateTime, Utc};
use pulsepoint_core::{AppError, AppResult};
use pulsepoint_knowledge::{AskOutcome, AskResponse, Citation};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// One question and the response it got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub asked_at: DateTime<Utc>,
    pub query: String,
    pub outcome: AskOutcome,
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl HistoryEntry {
    pub fn new(query: &str, response: &AskResponse) -> Self {
        Self {
            asked_at: Utc::now(),
            query: query.to_string(),
            outcome: response.outcome,
            answer: response.answer.clone(),
            citations: response.citations.clone(),
        }
    }
}

/// Append-only JSONL history file.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(workspace: &Path) -> Self {
        Self {
            path: workspace.join(".pulsepoint").join("history.jsonl"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, entry: &HistoryEntry) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AppError::Other(format!("Failed to open history.jsonl: {}", e)))?;

        let line = serde_json::to_string(entry)?;
        writeln!(file, "{}", line)
            .map_err(|e| AppError::Other(format!("Failed to write history.jsonl: {}", e)))?;

        tracing::debug!("Recorded history entry for query: {}", entry.query);
        Ok(())
    }

    /// All entries, oldest first.
    pub fn list(&self) -> AppResult<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .map_err(|e| AppError::Other(format!("Failed to open history.jsonl: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                AppError::Other(format!("Failed to read line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: HistoryEntry = serde_json::from_str(&line).map_err(|e| {
                AppError::Serialization(format!(
                    "Failed to parse line {} in history.jsonl: {}",
                    line_num + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    pub fn clear(&self) -> AppResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| AppError::Other(format!("Failed to delete history.jsonl: {}", e)))?;
            tracing::debug!("Cleared history.jsonl");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn answered(text: &str) -> AskResponse {
        AskResponse::answered(
            text.to_string(),
            vec![Citation {
                thread_id: "mig001".to_string(),
                source_label: "r/migraine - mig001".to_string(),
                title: "Dark rooms".to_string(),
            }],
        )
    }

    #[test]
    fn test_record_and_list() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::new(temp.path());

        store
            .record(&HistoryEntry::new("first?", &answered("one")))
            .unwrap();
        store
            .record(&HistoryEntry::new(
                "chest pain",
                &AskResponse::safety_triggered("call 911"),
            ))
            .unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "first?");
        assert_eq!(entries[0].citations.len(), 1);
        assert_eq!(entries[1].outcome, AskOutcome::SafetyTriggered);
    }

    #[test]
    fn test_list_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(HistoryStore::new(temp.path()).list().unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::new(temp.path());
        store
            .record(&HistoryEntry::new("q", &answered("a")))
            .unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_line_is_reported() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::new(temp.path());
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{not json}\n").unwrap();

        let err = store.list().unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
