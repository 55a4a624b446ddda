//! Pipeline configuration
//!
//! Loaded once at startup from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CHAT_MODEL, DEFAULT_EMBED_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TOP_K,
};

/// Configuration of the decision pipeline and its external services
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Event log (CSV) shared with the feature dataflow
    pub csv_path: PathBuf,

    /// ONNX model or JSON model container
    pub model_path: PathBuf,

    /// OpenAI-compatible API
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub embed_model: String,
    pub chat_model: String,
    pub temperature: f32,

    /// Pinecone index data-plane host, e.g. `https://fraud-xxxx.svc.pinecone.io`
    pub pinecone_api_key: String,
    pub pinecone_index_host: String,

    /// Overrides the dimension reported by the index
    pub vector_dimension: Option<usize>,

    /// Nearest neighbours per semantic query
    pub top_k: usize,

    /// Optional prompt template file; built-in template otherwise
    pub prompt_template_path: Option<PathBuf>,

    /// Warn once the process has indexed this many decision logs
    pub corpus_review_threshold: Option<u64>,

    /// Directory for the dataflow's JSONL output
    pub features_output_dir: PathBuf,

    /// Dataflow poll fallback when no file event arrives
    pub dataflow_poll_interval: Duration,

    /// Per-call timeout of outbound HTTP requests
    pub http_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/transactions.csv"),
            model_path: PathBuf::from("model/fraud_model.onnx"),
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            pinecone_api_key: String::new(),
            pinecone_index_host: String::new(),
            vector_dimension: None,
            top_k: DEFAULT_TOP_K,
            prompt_template_path: None,
            corpus_review_threshold: None,
            features_output_dir: PathBuf::from("data/features"),
            dataflow_poll_interval: Duration::from_millis(1000),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            csv_path: env::var("CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_path),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),

            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),

            embed_model: env::var("EMBED_MODEL").unwrap_or(defaults.embed_model),

            chat_model: env::var("CHAT_MODEL").unwrap_or(defaults.chat_model),

            temperature: env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.temperature),

            pinecone_api_key: env::var("PINECONE_API_KEY").unwrap_or_default(),

            pinecone_index_host: env::var("PINECONE_INDEX_HOST").unwrap_or_default(),

            vector_dimension: env::var("PINECONE_DIMENSION")
                .ok()
                .and_then(|d| d.parse().ok()),

            top_k: env::var("RAG_TOP_K")
                .ok()
                .and_then(|k| k.parse().ok())
                .filter(|k| *k > 0)
                .unwrap_or(defaults.top_k),

            prompt_template_path: env::var("PROMPT_TEMPLATE_PATH").ok().map(PathBuf::from),

            corpus_review_threshold: env::var("CORPUS_REVIEW_THRESHOLD")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0),

            features_output_dir: env::var("FEATURES_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.features_output_dir),

            dataflow_poll_interval: env::var("DATAFLOW_POLL_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.dataflow_poll_interval),

            http_timeout: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }
}
