//! HTTP-backed stage predictors
//!
//! Each stage model runs behind its own model server. Upstreams follow the
//! same convention this service exposes: POST a JSON object to get one
//! prediction, POST a JSON array to get an array of the same length.

mod endpoint;
mod remote;

pub use endpoint::{EndpointConfig, RemoteEndpoint, DEFAULT_TIMEOUT_SECS};
pub use remote::{RemoteIdentifier, RemoteLabeler, RemoteModel};
