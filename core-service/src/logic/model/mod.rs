//! Model Module - fraud classifier inference
//!
//! Tách logic inference khỏi pipeline.
//! The engine only sees a `Classifier`; swap ONNX for a mock in tests.

pub mod inference;
pub mod loader;
pub mod threshold;

pub use inference::{
    Classifier, ClassifierOutput, EngineStatus, InferenceEngine, ScoreMode, Verdict,
};
pub use loader::{ModelArtifact, OnnxClassifier};
pub use threshold::is_flagged;
