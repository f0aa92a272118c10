//! Identifier -> index extraction -> labeler composition

use std::sync::Arc;

use nlp_serve_common::{IdentifiedSentence, LabelerInput, NomSrlResult, Result, ServiceError};
use tracing::{debug, error};

use crate::indices::predicate_indices;
use crate::predictor::{PredicateIdentifier, RoleLabeler};

/// Two-stage nominal SRL pipeline
///
/// The sentence handed to the labeler is always the caller's original text.
/// The identifier's word list is never re-joined, so predicate positions
/// stay aligned between the stages.
#[derive(Clone)]
pub struct NomSrlPipeline {
    identifier: Arc<dyn PredicateIdentifier>,
    labeler: Arc<dyn RoleLabeler>,
}

impl NomSrlPipeline {
    pub fn new(identifier: Arc<dyn PredicateIdentifier>, labeler: Arc<dyn RoleLabeler>) -> Self {
        Self {
            identifier,
            labeler,
        }
    }

    /// Annotate a single non-blank sentence
    pub async fn compose(&self, sentence: &str) -> Result<NomSrlResult> {
        let identified = self.identifier.identify(sentence).await?;
        let input = labeler_input(sentence, &identified)?;
        debug!(
            "Identified {} nominal predicates in {} words",
            input.indices.len(),
            identified.words.len()
        );

        self.labeler.label(&input).await
    }

    /// Annotate a batch of non-blank sentences
    ///
    /// The output has exactly one result per input sentence, in input order.
    /// Any cardinality disagreement between the stages fails the whole batch.
    pub async fn compose_batch(&self, sentences: &[String]) -> Result<Vec<NomSrlResult>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let identified = self.identifier.identify_batch(sentences).await?;
        check_batch_len("identifier", sentences.len(), identified.len())?;

        let mut inputs = Vec::with_capacity(sentences.len());
        for (sentence, identified) in sentences.iter().zip(&identified) {
            inputs.push(labeler_input(sentence, identified)?);
        }
        debug!(
            "Identified {} nominal predicates across {} sentences",
            inputs.iter().map(|i| i.indices.len()).sum::<usize>(),
            sentences.len()
        );

        let results = self.labeler.label_batch(&inputs).await?;
        check_batch_len("labeler", sentences.len(), results.len())?;

        Ok(results)
    }
}

/// Pair the original sentence with the predicate positions the identifier found
fn labeler_input(sentence: &str, identified: &IdentifiedSentence) -> Result<LabelerInput> {
    if identified.nominals.len() != identified.words.len() {
        error!(
            "Identifier returned {} flags for {} words",
            identified.nominals.len(),
            identified.words.len()
        );
        return Err(ServiceError::Consistency(format!(
            "predicate mask has {} flags but {} words",
            identified.nominals.len(),
            identified.words.len()
        )));
    }

    Ok(LabelerInput {
        sentence: sentence.to_string(),
        indices: predicate_indices(&identified.nominals),
    })
}

fn check_batch_len(stage: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        return Ok(());
    }

    error!(
        "Stage {} returned {} results for a batch of {}",
        stage, actual, expected
    );
    Err(ServiceError::Consistency(format!(
        "{stage} returned {actual} results for a batch of {expected}"
    )))
}
