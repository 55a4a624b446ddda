//! Test doubles for the pipeline's collaborator traits

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{GenerationError, InferenceError, RetrievalError};
use crate::logic::explain::{ChatModel, ChatRequest};
use crate::logic::features::FEATURE_COUNT;
use crate::logic::model::{Classifier, ClassifierOutput};
use crate::logic::retrieval::{
    EmbeddingClient, InMemoryVectorStore, KnowledgeBase, KnowledgeDocument, VectorMatch,
    VectorStore,
};
use crate::logic::transaction::{Transaction, TransactionType};

pub const TEST_DIMENSION: usize = 64;

/// TRANSFER of 250000 that empties the sender account
pub fn sample_transaction() -> Transaction {
    Transaction {
        step: 1,
        tx_type: TransactionType::Transfer,
        amount: 250_000.0,
        name_orig: "C1".to_string(),
        oldbalance_org: 250_000.0,
        newbalance_orig: 0.0,
        name_dest: "M1".to_string(),
        oldbalance_dest: 0.0,
        newbalance_dest: 250_000.0,
        is_fraud: None,
        is_flagged_fraud: None,
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

enum MockBehavior {
    ByAmount,
    Fixed(f32),
    Point(f32),
}

pub struct MockClassifier {
    behavior: MockBehavior,
    last_features: Mutex<Option<[f32; FEATURE_COUNT]>>,
}

impl MockClassifier {
    fn with(behavior: MockBehavior) -> Self {
        Self { behavior, last_features: Mutex::new(None) }
    }

    /// 0.92 for amounts above 200000, 0.08 otherwise
    pub fn by_amount() -> Self {
        Self::with(MockBehavior::ByAmount)
    }

    pub fn fixed(probability: f32) -> Self {
        Self::with(MockBehavior::Fixed(probability))
    }

    pub fn point(label: f32) -> Self {
        Self::with(MockBehavior::Point(label))
    }

    pub fn last_features(&self) -> Option<[f32; FEATURE_COUNT]> {
        *self.last_features.lock()
    }
}

impl Classifier for MockClassifier {
    fn score(&self, features: &[f32; FEATURE_COUNT]) -> Result<ClassifierOutput, InferenceError> {
        *self.last_features.lock() = Some(*features);
        Ok(match self.behavior {
            MockBehavior::ByAmount => {
                ClassifierOutput::Probability(if features[2] > 200_000.0 { 0.92 } else { 0.08 })
            }
            MockBehavior::Fixed(p) => ClassifierOutput::Probability(p),
            MockBehavior::Point(v) => ClassifierOutput::Point(v),
        })
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

// ============================================================================
// EMBEDDINGS / VECTOR STORE
// ============================================================================

/// Deterministic bag-of-words embedding: each lowercase token bumps one
/// hashed bucket. Texts sharing vocabulary end up close.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingClient for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut v = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|t| !t.is_empty())
        {
            let bucket = crc32fast::hash(token.to_lowercase().as_bytes()) as usize % self.dimension;
            v[bucket] += 1.0;
        }
        Ok(v)
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingClient for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
        Err(RetrievalError::Network("connection refused".to_string()))
    }
}

/// Every call fails with a 503
pub struct FailingVectorStore;

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn upsert(&self, _documents: Vec<KnowledgeDocument>) -> Result<(), RetrievalError> {
        Err(RetrievalError::Server(503))
    }

    async fn query(&self, _embedding: &[f32], _top_k: usize) -> Result<Vec<VectorMatch>, RetrievalError> {
        Err(RetrievalError::Server(503))
    }

    async fn dimension(&self) -> Result<Option<usize>, RetrievalError> {
        Err(RetrievalError::Server(503))
    }
}

/// Hash-embedded in-memory corpus; the store handle is returned for inspection
pub fn memory_corpus() -> (Arc<InMemoryVectorStore>, Arc<KnowledgeBase>) {
    let store = Arc::new(InMemoryVectorStore::new(TEST_DIMENSION));
    let corpus = KnowledgeBase::new(
        Arc::new(HashEmbedder::new(TEST_DIMENSION)),
        store.clone(),
        Some(TEST_DIMENSION),
    );
    (store, Arc::new(corpus))
}

pub fn failing_corpus() -> Arc<KnowledgeBase> {
    Arc::new(KnowledgeBase::new(
        Arc::new(HashEmbedder::new(TEST_DIMENSION)),
        Arc::new(FailingVectorStore),
        Some(TEST_DIMENSION),
    ))
}

// ============================================================================
// CHAT
// ============================================================================

enum Reply {
    Text(String),
    Fail,
}

/// Returns the same reply to every request and records the requests
pub struct ScriptedChat {
    reply: Reply,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn replying(text: &str) -> Self {
        Self { reply: Reply::Text(text.to_string()), requests: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { reply: Reply::Fail, requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        self.requests.lock().push(request.clone());
        match &self.reply {
            Reply::Text(t) => Ok(t.clone()),
            Reply::Fail => Err(GenerationError::Request("503 Service Unavailable".to_string())),
        }
    }
}
