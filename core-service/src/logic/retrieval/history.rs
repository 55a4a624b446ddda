//! Historical statistics over the event log
//!
//! Scans the whole log on every call (cost grows linearly with the log).
//! Concurrent scans may see different log lengths; the numbers are
//! advisory context for the explanation, not a decision input.

use serde::Serialize;

use crate::constants::{
    no_account_history, NO_HISTORY_AVAILABLE, NO_SIMILAR_AVAILABLE, NO_SIMILAR_FOUND,
    SIMILAR_AMOUNT_RATIO,
};
use crate::logic::event_log::{EventLog, LogRow};
use crate::logic::transaction::Transaction;

/// Two text summaries for the grounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoricalSummary {
    /// Sender account behavior
    pub behavior: String,
    /// Same-type, similar-amount cases and their fraud rate
    pub similar: String,
}

impl HistoricalSummary {
    /// Sentinel pair used when the log cannot be read at all
    pub fn unavailable() -> Self {
        Self {
            behavior: NO_HISTORY_AVAILABLE.to_string(),
            similar: NO_SIMILAR_AVAILABLE.to_string(),
        }
    }
}

/// `other` is within ±20% of `amount` (inclusive). Nothing is similar
/// to a zero or negative amount.
pub fn is_similar_amount(amount: f64, other: f64) -> bool {
    if amount <= 0.0 {
        return false;
    }
    (other - amount).abs() / amount <= SIMILAR_AMOUNT_RATIO
}

/// Read the log and summarize. Never fails: an absent or unreadable log
/// yields the "unavailable" sentinels.
pub async fn analyze(log: &EventLog, tx: &Transaction) -> HistoricalSummary {
    match log.read_rows().await {
        Ok(Some(rows)) => summarize(&rows, tx),
        Ok(None) => HistoricalSummary::unavailable(),
        Err(e) => {
            log::warn!("Historical scan of {} failed: {}", log.path().display(), e);
            HistoricalSummary::unavailable()
        }
    }
}

/// Pure aggregation over already-parsed rows
pub fn summarize(rows: &[LogRow], tx: &Transaction) -> HistoricalSummary {
    let account_id = tx.name_orig.as_str();
    let tx_type = tx.tx_type.as_str();

    let mut account_count = 0usize;
    let mut account_total = 0.0f64;
    // Insertion order matters: ties on frequency go to the type seen first
    let mut type_counts: Vec<(String, usize)> = Vec::new();

    let mut similar_count = 0usize;
    let mut similar_fraud = 0usize;

    for row in rows {
        // Empty amount counts as 0; garbage skips the row
        let raw_amount = row.get("amount").map(str::trim).unwrap_or("");
        let row_amount = if raw_amount.is_empty() {
            0.0
        } else {
            match raw_amount.parse::<f64>() {
                Ok(a) => a,
                Err(_) => continue,
            }
        };
        let row_type = row.get("type").unwrap_or("");

        if row.get("nameOrig") == Some(account_id) {
            account_count += 1;
            account_total += row_amount;
            match type_counts.iter_mut().find(|(t, _)| t == row_type) {
                Some((_, c)) => *c += 1,
                None => type_counts.push((row_type.to_string(), 1)),
            }
        }

        if row_type == tx_type && is_similar_amount(tx.amount, row_amount) {
            similar_count += 1;
            if row.flag("isFraud") {
                similar_fraud += 1;
            }
        }
    }

    let behavior = if account_count == 0 {
        no_account_history(account_id)
    } else {
        let avg_amount = account_total / account_count as f64;
        let most_common = type_counts
            .iter()
            .fold(None::<&(String, usize)>, |best, entry| match best {
                Some(b) if b.1 >= entry.1 => Some(b),
                _ => Some(entry),
            })
            .map(|(t, _)| t.as_str())
            .unwrap_or("unknown");
        let rare: Vec<&str> = type_counts
            .iter()
            .filter(|(t, c)| *c == 1 && t != most_common)
            .map(|(t, _)| t.as_str())
            .collect();

        let mut summary = format!(
            "Sender account {} has {} historical transactions with an average amount of {:.2}. \
             Most common type is {}.",
            account_id, account_count, avg_amount, most_common
        );
        if !rare.is_empty() {
            summary.push_str(&format!(" Rarely used types for this account: {}.", rare.join(", ")));
        }
        summary
    };

    let similar = if similar_count == 0 {
        NO_SIMILAR_FOUND.to_string()
    } else {
        let fraud_rate = similar_fraud as f64 / similar_count as f64;
        format!(
            "Across {} historical {} transactions with a similar amount, approximately {:.1}% \
             were labeled as fraudulent in past data.",
            similar_count,
            tx_type,
            fraud_rate * 100.0
        )
    };

    HistoricalSummary { behavior, similar }
}
