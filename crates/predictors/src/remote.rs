//! Stage trait implementations over [`RemoteEndpoint`]

use async_trait::async_trait;
use nlp_serve_common::{IdentifiedSentence, LabelerInput, NomSrlResult, Result, ServiceError};
use nlp_serve_pipeline::{Model, PredicateIdentifier, RoleLabeler};
use serde::Serialize;
use serde_json::Value;

use crate::endpoint::{EndpointConfig, RemoteEndpoint};

#[derive(Serialize)]
struct SentenceBody<'a> {
    sentence: &'a str,
}

/// Nominal predicate identifier served by a model server
#[derive(Debug, Clone)]
pub struct RemoteIdentifier {
    endpoint: RemoteEndpoint,
}

impl RemoteIdentifier {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        Ok(Self {
            endpoint: RemoteEndpoint::new("identifier", config)?,
        })
    }
}

#[async_trait]
impl PredicateIdentifier for RemoteIdentifier {
    async fn identify(&self, sentence: &str) -> Result<IdentifiedSentence> {
        self.endpoint.post(&SentenceBody { sentence }).await
    }

    async fn identify_batch(&self, sentences: &[String]) -> Result<Vec<IdentifiedSentence>> {
        let body: Vec<SentenceBody<'_>> = sentences
            .iter()
            .map(|sentence| SentenceBody { sentence })
            .collect();
        self.endpoint.post(&body).await
    }
}

/// Nominal sense/role labeler served by a model server
#[derive(Debug, Clone)]
pub struct RemoteLabeler {
    endpoint: RemoteEndpoint,
}

impl RemoteLabeler {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        Ok(Self {
            endpoint: RemoteEndpoint::new("labeler", config)?,
        })
    }
}

#[async_trait]
impl RoleLabeler for RemoteLabeler {
    async fn label(&self, input: &LabelerInput) -> Result<NomSrlResult> {
        self.endpoint.post(input).await
    }

    async fn label_batch(&self, inputs: &[LabelerInput]) -> Result<Vec<NomSrlResult>> {
        self.endpoint.post(inputs).await
    }
}

/// Any single model served by a model server, forwarded as raw JSON
#[derive(Debug, Clone)]
pub struct RemoteModel {
    endpoint: RemoteEndpoint,
}

impl RemoteModel {
    pub fn new(name: impl Into<String>, config: &EndpointConfig) -> Result<Self> {
        Ok(Self {
            endpoint: RemoteEndpoint::new(name, config)?,
        })
    }
}

#[async_trait]
impl Model for RemoteModel {
    fn name(&self) -> &str {
        self.endpoint.name()
    }

    async fn predict(&self, input: Value) -> Result<Value> {
        self.endpoint.post(&input).await
    }

    async fn predict_batch(&self, inputs: Vec<Value>) -> Result<Vec<Value>> {
        let outputs: Vec<Value> = self.endpoint.post(&inputs).await?;
        if outputs.len() != inputs.len() {
            return Err(ServiceError::Consistency(format!(
                "{} returned {} results for a batch of {}",
                self.endpoint.name(),
                outputs.len(),
                inputs.len()
            )));
        }
        Ok(outputs)
    }
}
