//! HTTP request handlers for API endpoints

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nlp_serve_common::{ErrorEnvelope, NomSrlRequest, ServiceError};
use nlp_serve_pipeline::{Model, NomSrlService};
use nlp_serve_word_vectors::WordVectors;
use serde_json::Value;
use tracing::{debug, info};

use crate::types::{ApiError, HealthResponse, NomSrlResponse, RequestPayload, VectorsResponse};

/// Health check endpoint
pub async fn health_check(State(routes): State<Arc<Vec<String>>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        routes: routes.as_ref().clone(),
    })
}

/// Nominal SRL over the identifier + labeler pipeline
///
/// A JSON object is one request, a JSON array is a batch. Blank sentences
/// yield the empty result without reaching the models.
pub async fn handle_nom_srl(
    State(service): State<NomSrlService>,
    body: Bytes,
) -> Result<Json<NomSrlResponse>, ApiError> {
    match RequestPayload::parse(&body)? {
        RequestPayload::Single(value) => {
            let request: NomSrlRequest = decode(value)?;
            let result = service.predict(request).await?;
            Ok(Json(NomSrlResponse::Single(result)))
        }
        RequestPayload::Batch(values) => {
            let requests = values
                .into_iter()
                .map(decode::<NomSrlRequest>)
                .collect::<Result<Vec<_>, _>>()?;
            info!("Nominal SRL batch request: {} items", requests.len());
            let results = service.predict_batch(requests).await?;
            Ok(Json(NomSrlResponse::Batch(results)))
        }
    }
}

/// Forward a request to a single model without composition
pub async fn handle_model(
    State(model): State<Arc<dyn Model>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let output = match RequestPayload::parse(&body)? {
        RequestPayload::Single(value) => model.predict(value).await?,
        RequestPayload::Batch(values) => {
            debug!("{} batch request: {} items", model.name(), values.len());
            Value::Array(model.predict_batch(values).await?)
        }
    };
    Ok(Json(output))
}

/// Phrase vectors for a JSON list of strings passed as `?tokens=[...]`
pub async fn handle_word_vectors(
    State(vectors): State<Arc<WordVectors>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(tokens) = params.get("tokens") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorEnvelope {
                error: "parameter `tokens` not found".to_string(),
            }),
        )
            .into_response();
    };

    let tokens: Vec<String> = match serde_json::from_str(tokens) {
        Ok(tokens) => tokens,
        Err(e) => {
            return ApiError(ServiceError::InvalidInput(format!("invalid tokens: {e}")))
                .into_response()
        }
    };

    let vectors = tokens
        .iter()
        .map(|token| vectors.phrase_vector(token))
        .collect();
    Json(VectorsResponse { vectors }).into_response()
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ServiceError> {
    serde_json::from_value(value)
        .map_err(|e| ServiceError::InvalidInput(format!("invalid request item: {e}")))
}
