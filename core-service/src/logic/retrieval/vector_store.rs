//! Vector store seam + in-memory backend

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// One entry of the knowledge corpus. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub embedding: Vec<f32>,
    pub text: String,
    /// File name for curated documents, `decision_log` for decisions
    pub source: String,
}

/// Query hit. `text` is absent when the stored metadata has none.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub text: Option<String>,
    pub source: Option<String>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, documents: Vec<KnowledgeDocument>) -> Result<(), RetrievalError>;

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, RetrievalError>;

    /// Index dimension, if the backend knows it
    async fn dimension(&self) -> Result<Option<usize>, RetrievalError>;
}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

/// Brute-force cosine similarity over a `Vec`. Local development and tests.
pub struct InMemoryVectorStore {
    dimension: usize,
    documents: RwLock<Vec<KnowledgeDocument>>,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_by_source(&self, source: &str) -> usize {
        self.documents.read().iter().filter(|d| d.source == source).count()
    }

    pub fn documents(&self) -> Vec<KnowledgeDocument> {
        self.documents.read().clone()
    }

    fn check_dimension(&self, actual: usize) -> Result<(), RetrievalError> {
        if actual == self.dimension {
            Ok(())
        } else {
            Err(RetrievalError::Dimension { expected: self.dimension, actual })
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, documents: Vec<KnowledgeDocument>) -> Result<(), RetrievalError> {
        for doc in &documents {
            self.check_dimension(doc.embedding.len())?;
        }

        let mut store = self.documents.write();
        for doc in documents {
            match store.iter_mut().find(|d| d.id == doc.id) {
                Some(existing) => *existing = doc,
                None => store.push(doc),
            }
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, RetrievalError> {
        self.check_dimension(embedding.len())?;

        let store = self.documents.read();
        let mut scored: Vec<(f32, &KnowledgeDocument)> = store
            .iter()
            .map(|doc| (cosine_similarity(embedding, &doc.embedding), doc))
            .collect();
        // Stable sort: ties keep insertion order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, doc)| VectorMatch {
                id: doc.id.clone(),
                score,
                text: Some(doc.text.clone()).filter(|t| !t.is_empty()),
                source: Some(doc.source.clone()),
            })
            .collect())
    }

    async fn dimension(&self) -> Result<Option<usize>, RetrievalError> {
        Ok(Some(self.dimension))
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
