//! Blank-aware nominal SRL service

use nlp_serve_common::{NomSrlRequest, NomSrlResult, Result};
use tracing::{debug, info};

use crate::batch::{is_blank, partition, reassemble};
use crate::compose::NomSrlPipeline;

/// Entry point used by the request boundary
///
/// Blank sentences short-circuit to the empty result in both single and
/// batch mode; everything else goes through [`NomSrlPipeline`].
#[derive(Clone)]
pub struct NomSrlService {
    pipeline: NomSrlPipeline,
}

impl NomSrlService {
    #[must_use]
    pub fn new(pipeline: NomSrlPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn predict(&self, request: NomSrlRequest) -> Result<NomSrlResult> {
        if is_blank(&request.sentence) {
            debug!("Blank sentence, returning empty result");
            return Ok(NomSrlResult::empty());
        }

        self.pipeline.compose(&request.sentence).await
    }

    pub async fn predict_batch(&self, requests: Vec<NomSrlRequest>) -> Result<Vec<NomSrlResult>> {
        let batch = partition(requests);
        info!(
            "Nominal SRL batch: {} sentences ({} blank)",
            batch.len(),
            batch.blank_count()
        );

        let sentences: Vec<String> = batch
            .non_blank
            .into_iter()
            .map(|request| request.sentence)
            .collect();

        let results = if sentences.is_empty() {
            Vec::new()
        } else {
            self.pipeline.compose_batch(&sentences).await?
        };

        reassemble(&batch.blank, results)
    }
}
