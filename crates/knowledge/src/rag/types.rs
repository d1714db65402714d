//! Answer types returned by the pipeline.

use serde::{Deserialize, Serialize};

/// Rendered in place of an empty citation list.
pub const NO_SOURCES: &str = "No sources available";

/// Pointer back to a source thread. At most one per thread in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub thread_id: String,
    pub source_label: String,
    pub title: String,
}

impl Citation {
    /// Display form, `source_label: title`.
    pub fn display(&self) -> String {
        format!("{}: {}", self.source_label, self.title)
    }
}

/// How a query was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AskOutcome {
    /// Grounded answer generated from retrieved threads
    Answered,

    /// Nothing was retrieved; the answer is the fallback phrase
    NoInformation,

    /// The safety gate matched; the answer is the crisis message
    SafetyTriggered,
}

/// Response to a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,

    /// Source threads in first-retrieved order
    pub citations: Vec<Citation>,

    pub outcome: AskOutcome,
}

impl AskResponse {
    pub fn answered(answer: String, citations: Vec<Citation>) -> Self {
        Self {
            answer,
            citations,
            outcome: AskOutcome::Answered,
        }
    }

    pub fn no_information(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            citations: Vec::new(),
            outcome: AskOutcome::NoInformation,
        }
    }

    pub fn safety_triggered(message: impl Into<String>) -> Self {
        Self {
            answer: message.into(),
            citations: Vec::new(),
            outcome: AskOutcome::SafetyTriggered,
        }
    }
}

/// Render citations as a bulleted list.
pub fn render_citations(citations: &[Citation]) -> String {
    if citations.is_empty() {
        return NO_SOURCES.to_string();
    }

    citations
        .iter()
        .map(|c| format!("- {}", c.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(id: &str, title: &str) -> Citation {
        Citation {
            thread_id: id.to_string(),
            source_label: format!("r/migraine - {}", id),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_render_citations() {
        let rendered = render_citations(&[
            citation("abc123", "Dark rooms help"),
            citation("def456", "Magnesium?"),
        ]);
        assert_eq!(
            rendered,
            "- r/migraine - abc123: Dark rooms help\n- r/migraine - def456: Magnesium?"
        );
    }

    #[test]
    fn test_render_empty_citations() {
        assert_eq!(render_citations(&[]), "No sources available");
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let response = AskResponse::safety_triggered("call 911");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["outcome"], "safety_triggered");
        assert_eq!(json["citations"], serde_json::json!([]));
    }
}
