//! Safety gate for high-risk queries.
//!
//! Runs before retrieval on every query. A match short-circuits the
//! pipeline with fixed crisis resources; no model is consulted.

/// Phrases that route a query to crisis resources.
pub const DEFAULT_SAFETY_PHRASES: [&str; 16] = [
    "suicide",
    "kill myself",
    "end my life",
    "self-harm",
    "cut myself",
    "emergency",
    "chest pain",
    "can't breathe",
    "heart attack",
    "stroke",
    "surgery",
    "operate",
    "prescribe",
    "diagnosis",
    "blood",
    "severe pain",
];

/// Returned verbatim for every unsafe query.
pub const CRISIS_MESSAGE: &str = "Your query suggests you may need immediate professional medical assistance. Please contact:

- Emergency Services: 911 (US) or your local emergency number
- National Suicide Prevention Lifeline: 988 (US)
- Crisis Text Line: Text HOME to 741741

This system provides peer experiences only and is NOT a substitute for professional medical care.";

/// Outcome of the safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    Safe,
    Unsafe { message: String },
}

impl SafetyVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyVerdict::Safe)
    }
}

/// Case-insensitive substring matcher over a phrase list.
#[derive(Debug, Clone)]
pub struct SafetyGate {
    phrases: Vec<String>,
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_PHRASES.iter().copied())
    }
}

impl SafetyGate {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| normalize_apostrophes(&p.as_ref().trim().to_lowercase()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Check a query. Pure and deterministic.
    pub fn check(&self, query: &str) -> SafetyVerdict {
        let lowered = normalize_apostrophes(&query.to_lowercase());

        match self.phrases.iter().find(|p| lowered.contains(p.as_str())) {
            Some(phrase) => {
                tracing::info!(phrase = %phrase, "Safety gate triggered");
                SafetyVerdict::Unsafe {
                    message: CRISIS_MESSAGE.to_string(),
                }
            }
            None => SafetyVerdict::Safe,
        }
    }
}

/// Fold typographic apostrophes so "can’t breathe" matches "can't breathe".
fn normalize_apostrophes(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chest_pain_is_unsafe() {
        let gate = SafetyGate::default();
        match gate.check("I have chest pain, what helped you?") {
            SafetyVerdict::Unsafe { message } => {
                assert!(message.contains("911"));
                assert!(message.contains("988"));
                assert!(message.contains("741741"));
                assert_eq!(message, CRISIS_MESSAGE);
            }
            SafetyVerdict::Safe => panic!("expected unsafe verdict"),
        }
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let gate = SafetyGate::default();
        assert!(!gate.check("Thinking about SUICIDE").is_safe());
        assert!(!gate.check("Heart Attack symptoms?").is_safe());
    }

    #[test]
    fn test_typographic_apostrophe() {
        let gate = SafetyGate::default();
        assert!(!gate.check("I can\u{2019}t breathe at night").is_safe());
    }

    #[test]
    fn test_ordinary_questions_are_safe() {
        let gate = SafetyGate::default();
        assert!(gate.check("What helped with migraines?").is_safe());
        assert!(gate.check("Tips for managing IBS flare ups").is_safe());
        assert!(gate.check("").is_safe());
    }

    #[test]
    fn test_substring_matching_is_coarse() {
        // "bloodwork" contains "blood"; the gate errs on the cautious side
        let gate = SafetyGate::default();
        assert!(!gate.check("How long did your bloodwork take?").is_safe());
    }

    #[test]
    fn test_custom_phrases() {
        let gate = SafetyGate::new(["Overdose", "  "]);
        assert!(!gate.check("accidental overdose").is_safe());
        assert!(gate.check("chest pain").is_safe());
    }
}
