//! Fraud RAG core - transaction decision pipeline
//!
//! Scores a transaction with a pretrained classifier, records it in an
//! append-only event log, grounds the decision in retrieved knowledge and
//! account history, and asks a language model to explain it.

pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logic::pipeline::{DecisionPipeline, DecisionResponse, PipelineDeps};
