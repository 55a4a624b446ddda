use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::prompt::PromptTemplate;
use super::types::{split_bullets, ChatModel, ChatRequest, Explanation};
use crate::constants::{ANALYST_SYSTEM_ROLE, DECISION_LOG_SOURCE};
use crate::error::GenerationError;
use crate::logic::model::Verdict;
use crate::logic::retrieval::{GroundingContext, KnowledgeBase};
use crate::logic::transaction::Transaction;

/// Text written back to the corpus for every explained decision
pub fn decision_log_text(tx: &Transaction, verdict: &Verdict, explanation: &str) -> String {
    format!(
        "Decision log - amount={}, type={}, sender={}, receiver={}, fraud_prediction={}, \
         fraud_score={:.4}. Explanation: {}",
        tx.amount, tx.tx_type, tx.name_orig, tx.name_dest, verdict.is_fraud, verdict.score, explanation
    )
}

pub struct ExplanationGenerator {
    chat: Arc<dyn ChatModel>,
    corpus: Arc<KnowledgeBase>,
    template: PromptTemplate,
    temperature: f32,
    review_threshold: Option<u64>,
    indexed: AtomicU64,
}

impl ExplanationGenerator {
    pub fn new(
        chat: Arc<dyn ChatModel>,
        corpus: Arc<KnowledgeBase>,
        template: PromptTemplate,
        temperature: f32,
    ) -> Self {
        Self {
            chat,
            corpus,
            template,
            temperature,
            review_threshold: None,
            indexed: AtomicU64::new(0),
        }
    }

    /// Warn every time this many more decision logs have been indexed
    pub fn with_review_threshold(mut self, threshold: Option<u64>) -> Self {
        self.review_threshold = threshold.filter(|t| *t > 0);
        self
    }

    /// Decision logs indexed by this generator
    pub fn indexed_count(&self) -> u64 {
        self.indexed.load(Ordering::Relaxed)
    }

    /// Ask the model for bullets, then index the decision for future
    /// retrievals. A failed index write fails the whole call.
    pub async fn explain(
        &self,
        tx: &Transaction,
        verdict: &Verdict,
        context: &GroundingContext,
    ) -> Result<Explanation, GenerationError> {
        let request = ChatRequest {
            system: ANALYST_SYSTEM_ROLE.to_string(),
            user: self.template.render(tx, verdict, &context.render()),
            temperature: self.temperature,
        };

        let raw = self.chat.complete(&request).await?;
        let text = raw.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let bullets = split_bullets(text);
        if bullets.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let indexed_id = self
            .corpus
            .index(decision_log_text(tx, verdict, text), DECISION_LOG_SOURCE)
            .await
            .map_err(GenerationError::Index)?;
        self.note_indexed();

        log::debug!("Explained {} with {} bullets (doc {})", tx.name_orig, bullets.len(), indexed_id);

        Ok(Explanation { bullets, indexed_id })
    }

    fn note_indexed(&self) {
        let count = self.indexed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(threshold) = self.review_threshold {
            if count % threshold == 0 {
                log::warn!(
                    "{} decision logs indexed by this process; review the knowledge corpus \
                     (decision logs are never pruned and increasingly dominate retrieval)",
                    count
                );
            }
        }
    }
}
