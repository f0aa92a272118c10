//! Common types for the nominal and verb SRL services

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Service errors
///
/// Every variant is reported to HTTP clients as the same generic envelope;
/// the variant and its detail only reach the server log.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed request shape (wrong JSON type, missing field)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stage predictor failed during inference
    #[error("Model error in {stage}: {message}")]
    Model { stage: String, message: String },

    /// Two pipeline stages disagree on cardinality or alignment
    #[error("Consistency error: {0}")]
    Consistency(String),
}

impl ServiceError {
    /// Build a model error tagged with the stage that raised it
    pub fn model(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Model {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Error body returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub const INVALID_REQUEST: &'static str = "Invalid request";

    /// The generic envelope used for every internal failure
    #[must_use]
    pub fn invalid_request() -> Self {
        Self {
            error: Self::INVALID_REQUEST.to_string(),
        }
    }
}

/// Per-token 0/1 flags marking nominal predicates, aligned with the
/// identifier's tokenization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredicateMask(pub Vec<u8>);

impl PredicateMask {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &u8> {
        self.0.iter()
    }
}

impl From<Vec<u8>> for PredicateMask {
    fn from(flags: Vec<u8>) -> Self {
        Self(flags)
    }
}

/// Ascending token positions of the predicates in a sentence
pub type PredicateIndices = Vec<usize>;

/// Output of the predicate identification stage for one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedSentence {
    /// Predicate flags, one per entry of `words`
    pub nominals: PredicateMask,
    /// Identifier tokenization of the sentence
    pub words: Vec<String>,
}

/// Input of the role labeling stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelerInput {
    /// Sentence text, byte-identical to what the identifier saw
    pub sentence: String,
    /// Predicate positions to label
    pub indices: PredicateIndices,
}

/// One labeled nominal predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominalFrame {
    /// Predicate word
    pub nominal: String,
    /// Sense identifier (e.g. "01")
    pub sense: String,
    /// Token positions of the predicate
    pub predicate_index: Vec<usize>,
    /// Bracketed natural-language rendering of the frame
    pub description: String,
    /// Per-token BIO role tags
    pub tags: Vec<String>,
}

/// Nominal SRL result for one sentence
///
/// `NomSrlResult::default()` is the placeholder returned for blank input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomSrlResult {
    pub nominals: Vec<NominalFrame>,
    pub words: Vec<String>,
}

impl NomSrlResult {
    /// Placeholder for a blank sentence: no frames, no words
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the blank-input placeholder
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nominals.is_empty() && self.words.is_empty()
    }
}

/// One labeled verb predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbFrame {
    pub verb: String,
    pub sense: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Verb SRL result for one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbSrlResult {
    pub verbs: Vec<VerbFrame>,
    pub words: Vec<String>,
}

/// A single nominal SRL request item
///
/// Extra fields in the request object are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomSrlRequest {
    pub sentence: String,
}

impl NomSrlRequest {
    pub fn new(sentence: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_shape() {
        let json = serde_json::to_value(NomSrlResult::empty()).unwrap();
        assert_eq!(json, serde_json::json!({"nominals": [], "words": []}));
        assert!(NomSrlResult::default().is_empty());
    }

    #[test]
    fn test_identified_sentence_wire_format() {
        let json = r#"{"nominals": [0, 0, 1, 0], "words": ["Twitter", "confirms", "sale", "."]}"#;
        let identified: IdentifiedSentence = serde_json::from_str(json).unwrap();
        assert_eq!(identified.nominals, PredicateMask(vec![0, 0, 1, 0]));
        assert_eq!(identified.words.len(), 4);
    }

    #[test]
    fn test_request_ignores_extra_fields() {
        let json = r#"{"sentence": "The sale closed.", "id": 7}"#;
        let request: NomSrlRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.sentence, "The sale closed.");
    }

    #[test]
    fn test_request_requires_sentence() {
        let json = r#"{"text": "The sale closed."}"#;
        assert!(serde_json::from_str::<NomSrlRequest>(json).is_err());
    }

    #[test]
    fn test_error_envelope() {
        let json = serde_json::to_string(&ErrorEnvelope::invalid_request()).unwrap();
        assert_eq!(json, r#"{"error":"Invalid request"}"#);
    }

    #[test]
    fn test_model_error_display_names_stage() {
        let err = ServiceError::model("identifier", "connection refused");
        assert_eq!(
            err.to_string(),
            "Model error in identifier: connection refused"
        );
    }
}
