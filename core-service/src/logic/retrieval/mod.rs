//! Grounding Retriever
//!
//! Builds the context handed to the explanation step from two sources:
//! - semantic: nearest documents in the knowledge corpus
//! - statistical: sender behavior and similar past cases from the event log
//!
//! The semantic path is best-effort. Any embedding or vector-store error is
//! logged and yields an empty document list; the statistical path always
//! runs.

pub mod corpus;
pub mod embedding;
pub mod history;
pub mod pinecone;
pub mod vector_store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Serialize;

pub use corpus::KnowledgeBase;
pub use embedding::{adjust_dimension, EmbeddingClient};
pub use history::{HistoricalSummary, is_similar_amount};
pub use pinecone::{PineconeConfig, PineconeIndex};
pub use vector_store::{InMemoryVectorStore, KnowledgeDocument, VectorMatch, VectorStore};

use crate::logic::event_log::EventLog;
use crate::logic::model::Verdict;
use crate::logic::transaction::Transaction;

/// Ordered grounding material for one decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundingContext {
    pub semantic: Vec<String>,
    pub history: HistoricalSummary,
}

impl GroundingContext {
    /// Documents first, then the two historical summaries
    pub fn blocks(&self) -> Vec<String> {
        let mut blocks = self.semantic.clone();
        blocks.push(format!("Historical user behavior: {}", self.history.behavior));
        blocks.push(format!("Similar past cases: {}", self.history.similar));
        blocks
    }

    /// Blocks separated by blank lines, as they appear in the prompt
    pub fn render(&self) -> String {
        self.blocks().join("\n\n")
    }
}

/// Text that gets embedded for the similarity search
pub fn query_text(tx: &Transaction, verdict: &Verdict) -> String {
    format!(
        "Transaction amount {}, type {}, sender {}, receiver {}, fraud_prediction={}, fraud_score={:.4}.",
        tx.amount, tx.tx_type, tx.name_orig, tx.name_dest, verdict.is_fraud, verdict.score
    )
}

pub struct GroundingRetriever {
    corpus: Arc<KnowledgeBase>,
    event_log: EventLog,
    top_k: usize,
}

impl GroundingRetriever {
    pub fn new(corpus: Arc<KnowledgeBase>, event_log: EventLog, top_k: usize) -> Self {
        Self { corpus, event_log, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Never fails; degraded sources contribute empty or sentinel text
    pub async fn retrieve(&self, tx: &Transaction, verdict: &Verdict) -> GroundingContext {
        let query = query_text(tx, verdict);

        let (semantic, history) = tokio::join!(
            self.semantic_documents(&query),
            history::analyze(&self.event_log, tx),
        );

        log::debug!(
            "Grounding for {}: {} documents, history: {:?}",
            tx.name_orig,
            semantic.len(),
            history.behavior
        );

        GroundingContext { semantic, history }
    }

    async fn semantic_documents(&self, query: &str) -> Vec<String> {
        match self.corpus.search(query, self.top_k).await {
            Ok(docs) => docs,
            Err(e) => {
                log::warn!("Semantic retrieval degraded to empty: {}", e);
                Vec::new()
            }
        }
    }
}
