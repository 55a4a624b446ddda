//! Decision Orchestrator
//!
//! One transaction in, one decision out:
//! predict → annotate → append to event log → retrieve → explain → persist.
//!
//! A failure before the append leaves no trace. A failure after it leaves
//! the log line in place with no decision record; the log and the
//! decision store are not transactional.

use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::{PipelineResult, SetupError, StoreError};
use crate::logic::decision_log::{DecisionLogEntry, DecisionStore};
use crate::logic::event_log::{EventLog, LiveFeedEntry};
use crate::logic::explain::{ExplanationGenerator, PromptTemplate};
use crate::logic::model::{is_flagged, EngineStatus, InferenceEngine, OnnxClassifier};
use crate::logic::openai::{OpenAiClient, OpenAiConfig};
use crate::logic::retrieval::{GroundingRetriever, KnowledgeBase, PineconeConfig, PineconeIndex};
use crate::logic::transaction::{Transaction, TransactionRequest};

/// What the caller gets back for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub fraud_prediction: bool,
    pub fraud_score: f32,
    pub explanation: Vec<String>,
}

/// Everything the pipeline talks to, built once at startup
pub struct PipelineDeps {
    pub engine: Arc<InferenceEngine>,
    pub event_log: EventLog,
    pub retriever: Arc<GroundingRetriever>,
    pub generator: Arc<ExplanationGenerator>,
    pub decisions: Arc<dyn DecisionStore>,
}

impl PipelineDeps {
    /// Production wiring: ONNX model, OpenAI, Pinecone.
    /// The decision store is supplied by the host application.
    pub async fn from_config(
        config: &PipelineConfig,
        decisions: Arc<dyn DecisionStore>,
    ) -> Result<Self, SetupError> {
        let classifier = OnnxClassifier::from_path(&config.model_path)?;
        let engine = Arc::new(InferenceEngine::new(Arc::new(classifier)));

        let openai = Arc::new(OpenAiClient::new(OpenAiConfig {
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            embed_model: config.embed_model.clone(),
            chat_model: config.chat_model.clone(),
            timeout: config.http_timeout,
        })?);

        let index = Arc::new(PineconeIndex::new(PineconeConfig {
            index_host: config.pinecone_index_host.clone(),
            api_key: config.pinecone_api_key.clone(),
            timeout: config.http_timeout,
        })?);

        let corpus = Arc::new(KnowledgeBase::connect(openai.clone(), index, config.vector_dimension).await);

        let template = PromptTemplate::load(config.prompt_template_path.as_deref())
            .map_err(SetupError::Template)?;

        let event_log = EventLog::new(&config.csv_path);
        let retriever = Arc::new(GroundingRetriever::new(corpus.clone(), event_log.clone(), config.top_k));
        let generator = Arc::new(
            ExplanationGenerator::new(openai, corpus, template, config.temperature)
                .with_review_threshold(config.corpus_review_threshold),
        );

        log::info!(
            "Pipeline ready: model={}, log={}, top_k={}",
            engine.status().model_name,
            event_log.path().display(),
            config.top_k
        );

        Ok(Self { engine, event_log, retriever, generator, decisions })
    }
}

pub struct DecisionPipeline {
    deps: PipelineDeps,
}

impl DecisionPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self { deps }
    }

    pub fn event_log(&self) -> &EventLog {
        &self.deps.event_log
    }

    pub fn engine_status(&self) -> EngineStatus {
        self.deps.engine.status()
    }

    /// Validate a wire request, then decide it
    pub async fn handle_request(
        &self,
        user_id: &str,
        request: TransactionRequest,
    ) -> PipelineResult<DecisionResponse> {
        let tx = request.validate()?;
        self.handle(user_id, tx).await
    }

    pub async fn handle(&self, user_id: &str, mut tx: Transaction) -> PipelineResult<DecisionResponse> {
        tx.check()?;
        let verdict = self.deps.engine.predict(&tx)?;

        tx.is_fraud = Some(verdict.is_fraud);
        tx.is_flagged_fraud = Some(is_flagged(&verdict));

        self.deps.event_log.append_transaction(&tx).await?;

        let context = self.deps.retriever.retrieve(&tx, &verdict).await;
        let explanation = self.deps.generator.explain(&tx, &verdict, &context).await?;

        self.deps
            .decisions
            .persist(DecisionLogEntry::new(user_id, tx.amount, verdict.is_fraud, &explanation.bullets))
            .await?;

        log::info!(
            "Decision for {} {} {}: fraud={} score={:.4} flagged={}",
            user_id,
            tx.tx_type,
            tx.amount,
            verdict.is_fraud,
            verdict.score,
            tx.is_flagged_fraud.unwrap_or(false)
        );

        Ok(DecisionResponse {
            fraud_prediction: verdict.is_fraud,
            fraud_score: verdict.score,
            explanation: explanation.bullets,
        })
    }

    /// Persist a decision produced outside this pipeline (e.g. by the
    /// streaming dataflow). Nothing is scored, logged or indexed.
    pub async fn record_external(
        &self,
        user_id: &str,
        amount: f64,
        is_fraud: bool,
        explanation: &[String],
    ) -> Result<(), StoreError> {
        self.deps
            .decisions
            .persist(DecisionLogEntry::new(user_id, amount, is_fraud, explanation))
            .await
    }

    /// Live feed, newest first
    pub async fn recent(&self, limit: usize) -> io::Result<Vec<LiveFeedEntry>> {
        self.deps.event_log.recent(limit).await
    }
}
