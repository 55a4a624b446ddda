//! Central Configuration Constants
//!
//! Single source of truth for fixed thresholds, column names and
//! the sentinel texts the pipeline emits.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Fraud RAG";

// ============================================
// Decision thresholds (fixed, not calibrated per deployment)
// ============================================

/// Primary cut: `is_fraud = probability > FRAUD_THRESHOLD`
pub const FRAUD_THRESHOLD: f32 = 0.5;

/// Secondary cut: `is_flagged_fraud = is_fraud && score >= FLAG_THRESHOLD`
pub const FLAG_THRESHOLD: f32 = 0.65;

/// Dataflow: rows above this amount are marked `is_large_tx`
pub const LARGE_TX_AMOUNT: f64 = 200_000.0;

/// Historical scan: amounts within this ratio count as "similar"
pub const SIMILAR_AMOUNT_RATIO: f64 = 0.2;

// ============================================
// Event log schema
// ============================================

/// Canonical column order of the event log. Never reorder.
pub const CSV_COLUMNS: [&str; 11] = [
    "step",
    "type",
    "amount",
    "nameOrig",
    "oldbalanceOrg",
    "newbalanceOrig",
    "nameDest",
    "oldbalanceDest",
    "newbalanceDest",
    "isFraud",
    "isFlaggedFraud",
];

/// Placeholder sender when the client omits `nameOrig`
pub const DEFAULT_NAME_ORIG: &str = "C000000000";

/// Placeholder receiver when the client omits `nameDest`
pub const DEFAULT_NAME_DEST: &str = "M000000000";

// ============================================
// Retrieval / generation defaults
// ============================================

pub const DEFAULT_TOP_K: usize = 6;
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-large";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

pub const ANALYST_SYSTEM_ROLE: &str = "You are a senior fraud risk analyst at a digital bank.";

/// Source tag of documents written back by the pipeline
pub const DECISION_LOG_SOURCE: &str = "decision_log";

// ============================================
// Historical summary sentinels
// ============================================

pub const NO_HISTORY_AVAILABLE: &str = "No historical transaction data available for this account.";
pub const NO_SIMILAR_AVAILABLE: &str = "No similar past cases available from history.";
pub const NO_SIMILAR_FOUND: &str =
    "No closely similar historical transactions found for this amount and type.";

/// Sentinel for a sender with no rows in an otherwise readable log
pub fn no_account_history(account_id: &str) -> String {
    format!("No historical data found for sender account {}.", account_id)
}
