//! Stage predictor traits
//!
//! Implementations must tolerate concurrent calls through a shared reference.
//! Runtimes that cannot run concurrent inference are expected to queue
//! internally (see `nlp-serve-predictors` for a semaphore-limited endpoint).

use async_trait::async_trait;
use nlp_serve_common::{IdentifiedSentence, LabelerInput, NomSrlResult, Result};
use serde_json::Value;

/// Nominal predicate identification stage
#[async_trait]
pub trait PredicateIdentifier: Send + Sync {
    /// Tokenize `sentence` and flag the predicate tokens
    async fn identify(&self, sentence: &str) -> Result<IdentifiedSentence>;

    /// Batched `identify`; the output has one entry per input, in input order
    async fn identify_batch(&self, sentences: &[String]) -> Result<Vec<IdentifiedSentence>>;
}

/// Sense and role labeling stage
#[async_trait]
pub trait RoleLabeler: Send + Sync {
    /// Label the frames of the predicates at `input.indices`
    async fn label(&self, input: &LabelerInput) -> Result<NomSrlResult>;

    /// Batched `label`; the output has one entry per input, in input order
    async fn label_batch(&self, inputs: &[LabelerInput]) -> Result<Vec<NomSrlResult>>;
}

/// Opaque single-model predictor with untyped JSON payloads
///
/// Used by the passthrough routes (verb SRL, coreference, parsing) that
/// expose one model without any composition.
#[async_trait]
pub trait Model: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    async fn predict(&self, input: Value) -> Result<Value>;

    async fn predict_batch(&self, inputs: Vec<Value>) -> Result<Vec<Value>>;
}
