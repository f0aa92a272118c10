//! API request and response types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nlp_serve_common::{ErrorEnvelope, NomSrlResult, ServiceError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

/// Decoded request body: a JSON object is one item, a JSON array is a batch
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    Single(Value),
    Batch(Vec<Value>),
}

impl RequestPayload {
    /// Decode a raw body, rejecting anything but an object or an array
    pub fn parse(body: &[u8]) -> Result<Self, ServiceError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ServiceError::InvalidInput(format!("malformed JSON: {e}")))?;

        match value {
            Value::Object(_) => Ok(Self::Single(value)),
            Value::Array(items) => Ok(Self::Batch(items)),
            other => Err(ServiceError::InvalidInput(format!(
                "expected a JSON object or array, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Nominal SRL response: mirrors the request shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NomSrlResponse {
    Single(NomSrlResult),
    Batch(Vec<NomSrlResult>),
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Prediction routes served by this instance
    pub routes: Vec<String>,
}

/// Word vectors response, one vector per requested token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorsResponse {
    pub vectors: Vec<Vec<f32>>,
}

/// Handler error
///
/// Clients only ever see the generic envelope; the detailed error is logged.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the error
    ///
    /// Older deployments answered every failure with 200 and the error
    /// envelope; clients that only inspect the body keep working, clients
    /// that check the status now see 400, 502 or 500.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Model { .. } => StatusCode::BAD_GATEWAY,
            ServiceError::Consistency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("Request failed ({}): {}", status, self.0);
        (status, Json(ErrorEnvelope::invalid_request())).into_response()
    }
}
