//! Decision log - one persisted record per decided transaction
//!
//! The relational store lives outside the core; the pipeline only sees
//! `DecisionStore`.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Separator between explanation bullets in the stored text
pub const EXPLANATION_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub user_id: String,
    pub amount: f64,
    pub is_fraud: bool,
    /// Bullets joined with `" | "`
    pub explanation: String,
}

impl DecisionLogEntry {
    pub fn new(user_id: &str, amount: f64, is_fraud: bool, bullets: &[String]) -> Self {
        Self {
            user_id: user_id.to_string(),
            amount,
            is_fraud,
            explanation: bullets.join(EXPLANATION_SEPARATOR),
        }
    }
}

#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn persist(&self, entry: DecisionLogEntry) -> Result<(), StoreError>;
}

/// Keeps entries in a `Vec`. Local runs without a database, and tests.
#[derive(Default)]
pub struct InMemoryDecisionStore {
    entries: Mutex<Vec<DecisionLogEntry>>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DecisionLogEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl DecisionStore for InMemoryDecisionStore {
    async fn persist(&self, entry: DecisionLogEntry) -> Result<(), StoreError> {
        self.entries.lock().push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullets_joined_with_pipe() {
        let entry = DecisionLogEntry::new(
            "user-1",
            10.0,
            true,
            &["Balance drained".to_string(), "New receiver".to_string()],
        );
        assert_eq!(entry.explanation, "Balance drained | New receiver");
    }

    #[test]
    fn test_no_bullets_is_empty_text() {
        assert_eq!(DecisionLogEntry::new("u", 1.0, false, &[]).explanation, "");
    }

    #[tokio::test]
    async fn test_memory_store_keeps_order() {
        let store = InMemoryDecisionStore::new();
        store.persist(DecisionLogEntry::new("a", 1.0, false, &[])).await.unwrap();
        store.persist(DecisionLogEntry::new("b", 2.0, true, &[])).await.unwrap();

        let users: Vec<String> = store.entries().into_iter().map(|e| e.user_id).collect();
        assert_eq!(users, vec!["a", "b"]);
    }
}
