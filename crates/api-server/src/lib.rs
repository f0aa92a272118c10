//! REST API server for NLP model services
//!
//! Serves:
//! - Nominal SRL: identifier and labeler models composed into one endpoint
//! - Passthrough models: verb SRL, coreference, parsing, ... one route each
//! - Word vectors: phrase vectors from a fastText `.vec` table

pub mod config;
mod handlers;
mod types;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use nlp_serve_pipeline::{Model, NomSrlPipeline, NomSrlService};
use nlp_serve_predictors::{RemoteIdentifier, RemoteLabeler, RemoteModel};
use nlp_serve_word_vectors::WordVectors;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;

pub use handlers::*;
pub use types::*;

/// Services to expose, each bound to a route
///
/// Built once at startup and handed to [`build_router`]; handlers receive
/// only the collaborator for their own route.
#[derive(Clone, Default)]
pub struct ApiState {
    nom_srl: Option<(String, NomSrlService)>,
    models: Vec<(String, Arc<dyn Model>)>,
    word_vectors: Option<(String, Arc<WordVectors>)>,
}

impl ApiState {
    /// Create an empty state with no routes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve nominal SRL on `route`
    #[must_use]
    pub fn with_nom_srl(mut self, route: impl Into<String>, service: NomSrlService) -> Self {
        self.nom_srl = Some((route.into(), service));
        self
    }

    /// Serve a passthrough model on `route`
    #[must_use]
    pub fn with_model(mut self, route: impl Into<String>, model: Arc<dyn Model>) -> Self {
        self.models.push((route.into(), model));
        self
    }

    /// Serve phrase vectors on `route`
    #[must_use]
    pub fn with_word_vectors(mut self, route: impl Into<String>, vectors: Arc<WordVectors>) -> Self {
        self.word_vectors = Some((route.into(), vectors));
        self
    }

    /// Build every configured collaborator
    ///
    /// The word vectors file, if configured, is read on the blocking pool.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let mut state = Self::new();

        if let Some(nominal) = &config.nominal_srl {
            let identifier = RemoteIdentifier::new(&nominal.identifier)
                .context("Failed to create identifier client")?;
            let labeler =
                RemoteLabeler::new(&nominal.labeler).context("Failed to create labeler client")?;
            info!(
                "Nominal SRL on {}: identifier={}, labeler={}",
                nominal.route(),
                nominal.identifier.url,
                nominal.labeler.url
            );
            let pipeline = NomSrlPipeline::new(Arc::new(identifier), Arc::new(labeler));
            state = state.with_nom_srl(nominal.route(), NomSrlService::new(pipeline));
        }

        for model in &config.models {
            let remote = RemoteModel::new(&model.name, &model.endpoint)
                .with_context(|| format!("Failed to create client for model {}", model.name))?;
            info!("Model {} on {}: {}", model.name, model.route, model.endpoint.url);
            state = state.with_model(&model.route, Arc::new(remote));
        }

        if let Some(vectors) = &config.word_vectors {
            let path = vectors.path.clone();
            let table = tokio::task::spawn_blocking(move || WordVectors::load(&path))
                .await
                .context("Word vectors loader task failed")??;
            state = state.with_word_vectors(vectors.route(), Arc::new(table));
        }

        Ok(state)
    }

    /// Prediction routes, in registration order
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        let mut routes = Vec::new();
        if let Some((route, _)) = &self.nom_srl {
            routes.push(route.clone());
        }
        routes.extend(self.models.iter().map(|(route, _)| route.clone()));
        if let Some((route, _)) = &self.word_vectors {
            routes.push(route.clone());
        }
        routes
    }
}

/// Build the API router with all configured endpoints
pub fn build_router(state: ApiState) -> Router {
    let routes = Arc::new(state.routes());
    let mut router: Router = Router::new()
        .route("/health", get(health_check))
        .with_state(routes);

    if let Some((route, service)) = state.nom_srl {
        router = router.merge(
            Router::new()
                .route(&route, post(handle_nom_srl))
                .with_state::<()>(service),
        );
    }

    for (route, model) in state.models {
        router = router.merge(
            Router::new()
                .route(&route, post(handle_model))
                .with_state::<()>(model),
        );
    }

    if let Some((route, vectors)) = state.word_vectors {
        router = router.merge(
            Router::new()
                .route(&route, get(handle_word_vectors))
                .with_state::<()>(vectors),
        );
    }

    router.layer(TraceLayer::new_for_http())
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: ApiState) -> Result<(), std::io::Error> {
    let app = build_router(state);
    axum::serve(listener, app).await
}

/// Start the API server
pub async fn start_server(addr: &str, state: ApiState) -> Result<(), std::io::Error> {
    tracing::info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    serve(listener, state).await
}
