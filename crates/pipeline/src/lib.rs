//! Nominal SRL composition pipeline
//!
//! Composes two independently trained stage models into one API:
//! - Identifier: sentence -> per-token nominal predicate mask
//! - Labeler: (sentence, predicate positions) -> role-labeled frames
//!
//! Blank sentences never reach the models. Batches are split into blank and
//! non-blank items, only the non-blank ones run through the stages, and the
//! results are merged back in request order.

pub mod batch;
pub mod compose;
pub mod indices;
pub mod predictor;
pub mod service;

pub use batch::{is_blank, partition, reassemble, BatchPartition, HasSentence};
pub use compose::NomSrlPipeline;
pub use indices::predicate_indices;
pub use predictor::{Model, PredicateIdentifier, RoleLabeler};
pub use service::NomSrlService;

pub use nlp_serve_common::{Result, ServiceError};
