//! Typed client for the SRL endpoints
//!
//! ```no_run
//! # async fn run() -> Result<(), nlp_serve_client::ClientError> {
//! let client = nlp_serve_client::NomSrlClient::new("127.0.0.1", 8984);
//! let result = client.predict("Twitter confirms sale of company to Elon Musk.").await?;
//! for frame in &result.nominals {
//!     println!("{} ({}): {}", frame.nominal, frame.sense, frame.description);
//! }
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;

use nlp_serve_common::{NomSrlResult, VerbSrlResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Default port of the nominal SRL service
pub const NOM_SRL_PORT: u16 = 8984;

/// Default port of the verb SRL service
pub const VERB_SRL_PORT: u16 = 8983;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an `{"error": ...}` envelope
    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Serialize)]
struct SentenceBody<'a> {
    sentence: &'a str,
}

/// Client for an SRL endpoint returning results of type `R`
#[derive(Debug, Clone)]
pub struct SrlClient<R> {
    url: String,
    http: reqwest::Client,
    _result: PhantomData<fn() -> R>,
}

/// Nominal SRL client (`/cogcomp_nom_srl`)
pub type NomSrlClient = SrlClient<NomSrlResult>;

/// Verb SRL client (`/cogcomp_verb_srl`)
pub type VerbSrlClient = SrlClient<VerbSrlResult>;

impl SrlClient<NomSrlResult> {
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_url(format!("http://{host}:{port}/cogcomp_nom_srl"))
    }
}

impl Default for SrlClient<NomSrlResult> {
    fn default() -> Self {
        Self::new("127.0.0.1", NOM_SRL_PORT)
    }
}

impl SrlClient<VerbSrlResult> {
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_url(format!("http://{host}:{port}/cogcomp_verb_srl"))
    }
}

impl Default for SrlClient<VerbSrlResult> {
    fn default() -> Self {
        Self::new("127.0.0.1", VERB_SRL_PORT)
    }
}

impl<R: DeserializeOwned> SrlClient<R> {
    /// Client for an explicit endpoint URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
            _result: PhantomData,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Annotate one sentence
    pub async fn predict(&self, sentence: &str) -> Result<R> {
        self.post(&SentenceBody { sentence }).await
    }

    /// Annotate a batch; results come back in input order
    pub async fn batch_predict<S: AsRef<str>>(&self, sentences: &[S]) -> Result<Vec<R>> {
        let body: Vec<SentenceBody<'_>> = sentences
            .iter()
            .map(|s| SentenceBody {
                sentence: s.as_ref(),
            })
            .collect();
        self.post(&body).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, body: &B) -> Result<T> {
        let value: serde_json::Value = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
            return Err(ClientError::Server(message.to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }
}
