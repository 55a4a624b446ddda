//! Inference Engine - transaction → verdict
//!
//! Encodes the transaction with the fixed feature layout and scores it
//! with a pretrained binary classifier. The decision threshold is fixed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::threshold::is_fraud_probability;
use crate::error::InferenceError;
use crate::logic::features::{FeatureVector, FEATURE_COUNT};
use crate::logic::transaction::Transaction;

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// What the underlying estimator gave back
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifierOutput {
    /// Positive-class probability
    Probability(f32),
    /// Point prediction only; used as the probability directly
    Point(f32),
}

/// Trait for binary classifiers (ONNX, mocks, ...)
pub trait Classifier: Send + Sync {
    fn score(&self, features: &[f32; FEATURE_COUNT]) -> Result<ClassifierOutput, InferenceError>;
    fn describe(&self) -> String;
}

// ============================================================================
// VERDICT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    Probability,
    /// Degraded granularity: score is a class label, not a probability
    PointPrediction,
}

/// Model output for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_fraud: bool,
    /// 0.0 - 1.0
    pub score: f32,
    pub mode: ScoreMode,
}

/// Engine status for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct InferenceEngine {
    classifier: Arc<dyn Classifier>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl InferenceEngine {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Score a transaction. Deterministic for a deterministic classifier.
    pub fn predict(&self, tx: &Transaction) -> Result<Verdict, InferenceError> {
        let features = FeatureVector::encode(tx);
        let start = Instant::now();

        let output = self.classifier.score(features.as_array())?;

        let (raw, mode) = match output {
            ClassifierOutput::Probability(p) => (p, ScoreMode::Probability),
            ClassifierOutput::Point(p) => (p, ScoreMode::PointPrediction),
        };
        if !raw.is_finite() {
            return Err(InferenceError::Runtime(format!("non-finite score: {}", raw)));
        }

        let score = raw.clamp(0.0, 1.0);
        let verdict = Verdict {
            is_fraud: is_fraud_probability(score),
            score,
            mode,
        };

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "Scored {} {} -> fraud={} score={:.4} ({:?}) features={}",
            tx.tx_type,
            tx.name_orig,
            verdict.is_fraud,
            verdict.score,
            verdict.mode,
            features.to_log_entry()
        );

        Ok(verdict)
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_name: self.classifier.describe(),
            inference_device: "ONNX Runtime (CPU)".to_string(),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}
