//! Prediction log model - decision log entries in PostgreSQL

use async_trait::async_trait;
use fraud_rag_core::error::StoreError;
use fraud_rag_core::logic::decision_log::{DecisionLogEntry, DecisionStore};
use sqlx::PgPool;
use uuid::Uuid;

/// `DecisionStore` backed by the `prediction_logs` table
#[derive(Clone)]
pub struct PredictionLogStore {
    pool: PgPool,
}

impl PredictionLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DecisionStore for PredictionLogStore {
    async fn persist(&self, entry: DecisionLogEntry) -> Result<(), StoreError> {
        let user_id = Uuid::parse_str(&entry.user_id)
            .map_err(|e| StoreError(format!("invalid user id {}: {}", entry.user_id, e)))?;

        sqlx::query(
            r#"
            INSERT INTO prediction_logs (user_id, amount, is_fraud, explanation)
            VALUES ($1, $2, $3, $4)
            "#
        )
        .bind(user_id)
        .bind(entry.amount)
        .bind(entry.is_fraud)
        .bind(&entry.explanation)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError(e.to_string()))?;

        Ok(())
    }
}
