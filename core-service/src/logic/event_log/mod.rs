//! Event Log - append-only CSV record of every transaction
//!
//! The system of record shared by the request path (append, historical
//! scans, live feed) and the feature dataflow (tailing).
//! Rows are never rewritten or removed; the header is written once.

mod row;
mod writer;

#[cfg(test)]
mod tests;

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use row::{header_line, parse_header, LogRow};

use crate::error::DurabilityError;
use crate::logic::transaction::Transaction;

/// Handle to the event log file
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a row; I/O errors surface unchanged, nothing is retried
    pub async fn append(&self, row: &LogRow) -> Result<(), DurabilityError> {
        writer::append_row(&self.path, row).await
    }

    pub async fn append_transaction(&self, tx: &Transaction) -> Result<(), DurabilityError> {
        self.append(&LogRow::from_transaction(tx)).await
    }

    /// Read every data row.
    /// `Ok(None)` when the log does not exist yet.
    pub async fn read_rows(&self) -> io::Result<Option<Vec<LogRow>>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(Some(parse_log(&content)))
    }

    /// Most recent `limit` rows, newest first.
    pub async fn recent(&self, limit: usize) -> io::Result<Vec<LiveFeedEntry>> {
        let rows = self.read_rows().await?.unwrap_or_default();
        let generated_at = Utc::now();

        Ok(rows
            .iter()
            .rev()
            .take(limit)
            .map(|row| LiveFeedEntry::from_row(row, generated_at))
            .collect())
    }
}

/// Parse a whole log: first line is the header, blank lines are skipped
pub fn parse_log(content: &str) -> Vec<LogRow> {
    let mut lines = content.lines();
    let header = match lines.next() {
        Some(h) => parse_header(h),
        None => return Vec::new(),
    };

    lines
        .filter(|l| !l.trim().is_empty())
        .map(|l| LogRow::parse(&header, l))
        .collect()
}

// ============================================================================
// LIVE FEED
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Flagged,
    Processed,
}

/// Dashboard view of one log row.
///
/// `timestamp` is when this entry was generated, NOT when the
/// transaction happened; the log carries no wall-clock time.
#[derive(Debug, Clone, Serialize)]
pub struct LiveFeedEntry {
    pub step: Option<u64>,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: Option<f64>,
    #[serde(rename = "nameOrig")]
    pub name_orig: String,
    #[serde(rename = "nameDest")]
    pub name_dest: String,
    #[serde(rename = "isFraud")]
    pub is_fraud: bool,
    #[serde(rename = "isFlaggedFraud")]
    pub is_flagged_fraud: bool,
    pub status: FeedStatus,
    pub timestamp: DateTime<Utc>,
}

impl LiveFeedEntry {
    fn from_row(row: &LogRow, generated_at: DateTime<Utc>) -> Self {
        let is_fraud = row.flag("isFraud");
        let is_flagged_fraud = row.flag("isFlaggedFraud");

        Self {
            step: row.number("step").map(|s| s as u64),
            tx_type: row.get("type").unwrap_or_default().to_string(),
            amount: row.number("amount"),
            name_orig: row.get("nameOrig").unwrap_or_default().to_string(),
            name_dest: row.get("nameDest").unwrap_or_default().to_string(),
            is_fraud,
            is_flagged_fraud,
            status: if is_fraud || is_flagged_fraud {
                FeedStatus::Flagged
            } else {
                FeedStatus::Processed
            },
            timestamp: generated_at,
        }
    }
}
