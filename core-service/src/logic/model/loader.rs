//! Model loading - artifact resolution + ONNX classifier
//!
//! A model file is either a bare ONNX graph or a small JSON container
//! pointing at one. The shape is decided once, at load time.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};
use parking_lot::Mutex;
use serde_json::Value;

use super::inference::{Classifier, ClassifierOutput};
use crate::error::InferenceError;
use crate::logic::features::FEATURE_COUNT;

/// Container keys, tried in this order
pub const CONTAINER_KEYS: [&str; 3] = ["model", "estimator", "clf"];

// ============================================================================
// ARTIFACT
// ============================================================================

/// Resolved shape of a persisted model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelArtifact {
    /// The file is the estimator itself
    Raw { path: PathBuf },
    /// The file wraps the estimator under `key`
    Wrapped {
        key: &'static str,
        container: PathBuf,
        estimator: PathBuf,
    },
}

impl ModelArtifact {
    /// Inspect `path` and decide its shape.
    ///
    /// JSON objects are containers: the first known key whose value is a
    /// string names the estimator file (relative to the container).
    /// A container with no known key is rejected.
    pub fn resolve(path: &Path) -> Result<Self, InferenceError> {
        let bytes = std::fs::read(path)
            .map_err(|e| InferenceError::ModelNotFound(format!("{}: {}", path.display(), e)))?;

        let Some(container) = parse_container(&bytes)? else {
            return Ok(Self::Raw { path: path.to_path_buf() });
        };

        for key in CONTAINER_KEYS {
            match container.get(key) {
                Some(Value::String(inner)) => {
                    let base = path.parent().unwrap_or_else(|| Path::new("."));
                    let estimator = base.join(inner);

                    // Containers do not nest
                    let inner_bytes = std::fs::read(&estimator).map_err(|e| {
                        InferenceError::ModelNotFound(format!("{}: {}", estimator.display(), e))
                    })?;
                    if parse_container(&inner_bytes)?.is_some() {
                        return Err(InferenceError::InvalidContainer(format!(
                            "{} wraps another container",
                            path.display()
                        )));
                    }

                    return Ok(Self::Wrapped {
                        key,
                        container: path.to_path_buf(),
                        estimator,
                    });
                }
                Some(other) => {
                    return Err(InferenceError::InvalidContainer(format!(
                        "key `{}` must be a path string, got {}",
                        key, other
                    )));
                }
                None => continue,
            }
        }

        Err(InferenceError::UnknownContainer)
    }

    /// Path of the concrete estimator
    pub fn estimator_path(&self) -> &Path {
        match self {
            Self::Raw { path } => path,
            Self::Wrapped { estimator, .. } => estimator,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Raw { path } => path.display().to_string(),
            Self::Wrapped { key, container, estimator } => format!(
                "{}[{}] -> {}",
                container.display(),
                key,
                estimator.display()
            ),
        }
    }
}

/// `Some(object)` if the bytes are a JSON object, `None` for anything
/// that does not start like one (ONNX protobuf never starts with `{`).
fn parse_container(bytes: &[u8]) -> Result<Option<serde_json::Map<String, Value>>, InferenceError> {
    let starts_like_json = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{');
    if !starts_like_json {
        return Ok(None);
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(InferenceError::InvalidContainer("not a JSON object".to_string())),
        Err(e) => Err(InferenceError::InvalidContainer(e.to_string())),
    }
}

// ============================================================================
// OUTPUT SELECTION
// ============================================================================

/// Name and kind of one model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub name: String,
    pub is_tensor: bool,
}

/// Pick the probability output (a tensor whose name mentions `prob`) and
/// the point-prediction output (first tensor output).
///
/// Non-tensor outputs, such as a sklearn ZipMap `seq(map)` of class
/// probabilities, cannot be read as tensors and are skipped here.
pub fn select_outputs(outputs: &[OutputInfo]) -> Result<(Option<String>, String), InferenceError> {
    for skipped in outputs.iter().filter(|o| !o.is_tensor) {
        log::warn!("Ignoring non-tensor model output `{}`", skipped.name);
    }

    let tensors: Vec<&OutputInfo> = outputs.iter().filter(|o| o.is_tensor).collect();

    let probability = tensors
        .iter()
        .find(|o| o.name.to_lowercase().contains("prob"))
        .map(|o| o.name.clone());
    let point = tensors
        .first()
        .map(|o| o.name.clone())
        .ok_or(InferenceError::NoOutput)?;

    Ok((probability, point))
}

// ============================================================================
// ONNX CLASSIFIER
// ============================================================================

/// Binary classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    session: Mutex<Session>,
    probability_output: Option<String>,
    point_output: String,
    source: String,
}

impl OnnxClassifier {
    pub fn load(artifact: &ModelArtifact) -> Result<Self, InferenceError> {
        let path = artifact.estimator_path();
        log::info!("Loading ONNX model from: {}", artifact.describe());

        let session = Session::builder()
            .map_err(|e| InferenceError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| InferenceError::Runtime(format!("Failed to load model: {}", e)))?;

        let outputs: Vec<OutputInfo> = session
            .outputs
            .iter()
            .map(|o| OutputInfo {
                name: o.name.clone(),
                is_tensor: matches!(o.output_type, ValueType::Tensor { .. }),
            })
            .collect();
        let (probability_output, point_output) = select_outputs(&outputs)?;

        match &probability_output {
            Some(name) => log::info!("ONNX model loaded, probability output `{}`", name),
            None => log::warn!(
                "ONNX model exposes no probability tensor; using `{}` as point prediction",
                point_output
            ),
        }

        Ok(Self {
            session: Mutex::new(session),
            probability_output,
            point_output,
            source: artifact.describe(),
        })
    }

    /// Resolve and load in one step
    pub fn from_path(path: &Path) -> Result<Self, InferenceError> {
        let artifact = ModelArtifact::resolve(path)?;
        Self::load(&artifact)
    }
}

impl Classifier for OnnxClassifier {
    fn score(&self, features: &[f32; FEATURE_COUNT]) -> Result<ClassifierOutput, InferenceError> {
        let input = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
            .map_err(|e| InferenceError::Runtime(format!("Array error: {}", e)))?;
        let tensor = Tensor::from_array(input)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| InferenceError::Runtime(format!("Inference failed: {}", e)))?;

        if let Some(name) = &self.probability_output {
            let value = outputs.get(name.as_str()).ok_or(InferenceError::NoOutput)?;
            let (_, data) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::Runtime(format!("Extract error: {}", e)))?;

            // [1, 2] → positive class column; [1] or [1, 1] → single column
            let prob = match data.len() {
                0 => return Err(InferenceError::NoOutput),
                1 => data[0],
                _ => data[1],
            };
            return Ok(ClassifierOutput::Probability(prob));
        }

        let value = outputs
            .get(self.point_output.as_str())
            .ok_or(InferenceError::NoOutput)?;
        let point = match value.try_extract_tensor::<f32>() {
            Ok((_, data)) => data.first().copied(),
            Err(_) => value
                .try_extract_tensor::<i64>()
                .map_err(|e| InferenceError::Runtime(format!("Extract error: {}", e)))?
                .1
                .first()
                .map(|label| *label as f32),
        };

        point.map(ClassifierOutput::Point).ok_or(InferenceError::NoOutput)
    }

    fn describe(&self) -> String {
        self.source.clone()
    }
}
