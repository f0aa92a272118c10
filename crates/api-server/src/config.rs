//! Configuration loading for the API server.

use anyhow::{bail, Context, Result};
use nlp_serve_predictors::EndpointConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8984;

/// Default route of the nominal SRL pipeline
pub const DEFAULT_NOM_SRL_ROUTE: &str = "/cogcomp_nom_srl";

/// Default route of the word vectors lookup
pub const DEFAULT_WORD_VECTORS_ROUTE: &str = "/fasttext";

const RESERVED_ROUTES: &[&str] = &["/health"];

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub nominal_srl: Option<NominalSrlConfig>,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    pub word_vectors: Option<WordVectorsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Two-stage nominal SRL: identifier and labeler model servers
#[derive(Debug, Deserialize, Clone)]
pub struct NominalSrlConfig {
    pub route: Option<String>,
    pub identifier: EndpointConfig,
    pub labeler: EndpointConfig,
}

/// A single model exposed as-is on its own route
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub name: String,
    pub route: String,
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WordVectorsConfig {
    pub path: PathBuf,
    pub route: Option<String>,
}

impl NominalSrlConfig {
    pub fn route(&self) -> &str {
        self.route.as_deref().unwrap_or(DEFAULT_NOM_SRL_ROUTE)
    }
}

impl WordVectorsConfig {
    pub fn route(&self) -> &str {
        self.route.as_deref().unwrap_or(DEFAULT_WORD_VECTORS_ROUTE)
    }
}

impl Config {
    pub fn host(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|server| server.host.as_deref())
            .unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|server| server.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }

    /// Override the bind address from the command line
    pub fn override_server(&mut self, host: Option<String>, port: Option<u16>) {
        let server = self.server.get_or_insert_with(ServerConfig::default);
        if host.is_some() {
            server.host = host;
        }
        if port.is_some() {
            server.port = port;
        }
    }

    /// All prediction routes, in registration order
    pub fn routes(&self) -> Vec<&str> {
        let mut routes = Vec::new();
        if let Some(nominal) = &self.nominal_srl {
            routes.push(nominal.route());
        }
        routes.extend(self.models.iter().map(|model| model.route.as_str()));
        if let Some(vectors) = &self.word_vectors {
            routes.push(vectors.route());
        }
        routes
    }

    /// Reject configurations the router cannot serve
    pub fn validate(&self) -> Result<()> {
        let routes = self.routes();
        if routes.is_empty() {
            bail!("No services configured: add [nominal_srl], [[models]] or [word_vectors]");
        }

        let mut seen = HashSet::with_capacity(routes.len());
        for route in routes {
            if !route.starts_with('/') || route.len() < 2 {
                bail!("Route must start with '/' and name a path: {route:?}");
            }
            if RESERVED_ROUTES.contains(&route) {
                bail!("Route is reserved: {route}");
            }
            if !seen.insert(route) {
                bail!("Route configured twice: {route}");
            }
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config =
        toml::from_str(&contents).context("Failed to parse config file as TOML")?;
    Ok(config)
}
