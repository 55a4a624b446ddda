//! Error taxonomy of the decision pipeline
//!
//! Each stage has its own error type; `PipelineError` is what
//! `DecisionPipeline::handle` surfaces to callers.

use thiserror::Error;

/// Event log write failed. Fatal for the request, never retried.
#[derive(Debug, Error)]
#[error("event log write failed: {0}")]
pub struct DurabilityError(#[from] pub std::io::Error);

/// Transaction could not be encoded into model features.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodingError {
    #[error("unknown transaction type: {0}")]
    UnknownType(String),

    #[error("malformed field `{field}`: {reason}")]
    Malformed { field: &'static str, reason: String },
}

/// Model loading or scoring failure.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("model container has none of the known keys (model, estimator, clf)")]
    UnknownContainer,

    #[error("invalid model container: {0}")]
    InvalidContainer(String),

    #[error("onnx runtime error: {0}")]
    Runtime(String),

    #[error("model produced no usable output")]
    NoOutput,
}

/// Embedding or vector store call failed. Degraded locally by the retriever.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server error: {0}")]
    Server(u16),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("service not configured: {0}")]
    NotConfigured(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Explanation could not be produced or indexed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("language model request failed: {0}")]
    Request(String),

    #[error("language model returned empty content")]
    EmptyResponse,

    #[error("failed to index decision log: {0}")]
    Index(#[source] RetrievalError),
}

/// Decision log persistence failure (relational store collaborator).
#[derive(Debug, Error)]
#[error("decision store error: {0}")]
pub struct StoreError(pub String);

/// Anything that aborts `handle` for one transaction.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Durability(#[from] DurabilityError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Startup wiring failed; the process should not serve requests.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Model(#[from] InferenceError),

    #[error(transparent)]
    Service(#[from] RetrievalError),

    #[error("failed to load prompt template: {0}")]
    Template(#[source] std::io::Error),
}
