//! Progress reporting for index builds.
//!
//! Builds emit one event per phase step; the CLI prints them to stderr.

use std::sync::Arc;
use std::time::Instant;

/// Progress event emitted during an index build.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase of the build: "chunk", "embed", "persist"
    pub phase: String,

    /// Work done so far (threads chunked, batches embedded)
    pub current: u64,

    /// Total expected work, if known
    pub total: Option<u64>,

    pub message: String,

    /// Seconds since the build started
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    pub fn new(
        phase: impl Into<String>,
        current: u64,
        total: Option<u64>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase: phase.into(),
            current,
            total,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Percentage complete, when the total is known and non-zero.
    pub fn percentage(&self) -> Option<f64> {
        self.total
            .filter(|t| *t > 0)
            .map(|t| (self.current as f64 / t as f64) * 100.0)
    }

    /// Format as a single user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => self.current.to_string(),
        };

        let pct = self
            .percentage()
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Emits build events through an optional callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// A reporter that drops every event.
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    pub fn emit(&self, event: ProgressEvent) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let event = event.with_elapsed(elapsed);

        tracing::debug!(
            phase = %event.phase,
            current = event.current,
            total = ?event.total,
            elapsed_secs = elapsed,
            "{}",
            event.message
        );

        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    pub fn chunk(&self, threads_done: u64, total_threads: u64, chunks_created: usize) {
        self.emit(ProgressEvent::new(
            "chunk",
            threads_done,
            Some(total_threads),
            format!("{} chunks created", chunks_created),
        ));
    }

    pub fn embed(&self, batches_done: u64, total_batches: u64, version: &str) {
        self.emit(ProgressEvent::new(
            "embed",
            batches_done,
            Some(total_batches),
            format!("embedding={}", version),
        ));
    }

    pub fn persist(&self, entries: u64, path: &str) {
        self.emit(ProgressEvent::new(
            "persist",
            entries,
            None,
            format!("writing {}", path),
        ));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}
