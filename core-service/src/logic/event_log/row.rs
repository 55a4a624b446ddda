use std::collections::HashMap;

use crate::constants::CSV_COLUMNS;
use crate::logic::transaction::Transaction;

/// One event log row, keyed by column name.
///
/// Columns that are absent are written as empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRow {
    values: HashMap<String, String>,
}

impl LogRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transaction(tx: &Transaction) -> Self {
        let mut row = Self::new();
        row.set("step", tx.step.to_string());
        row.set("type", tx.tx_type.as_str());
        row.set("amount", tx.amount.to_string());
        row.set("nameOrig", tx.name_orig.as_str());
        row.set("oldbalanceOrg", tx.oldbalance_org.to_string());
        row.set("newbalanceOrig", tx.newbalance_orig.to_string());
        row.set("nameDest", tx.name_dest.as_str());
        row.set("oldbalanceDest", tx.oldbalance_dest.to_string());
        row.set("newbalanceDest", tx.newbalance_dest.to_string());
        if let Some(fraud) = tx.is_fraud {
            row.set("isFraud", flag_str(fraud));
        }
        if let Some(flagged) = tx.is_flagged_fraud {
            row.set("isFlaggedFraud", flag_str(flagged));
        }
        row
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.values.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Column value parsed as a number; `None` if absent or malformed
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse().ok())
    }

    /// Label columns are truthy for `1` or `true` (any case)
    pub fn flag(&self, column: &str) -> bool {
        match self.get(column).map(str::trim) {
            Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
            None => false,
        }
    }

    /// First canonical column whose value contains a separator
    pub fn separator_column(&self) -> Option<&'static str> {
        CSV_COLUMNS
            .into_iter()
            .find(|col| self.get(col).is_some_and(|v| v.contains([',', '\n', '\r'])))
    }

    /// Values in canonical column order, comma separated, no newline
    pub fn to_line(&self) -> String {
        CSV_COLUMNS
            .iter()
            .map(|col| self.get(col).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Map a data line onto the given header.
    /// Short lines leave trailing columns absent; extra fields are ignored.
    pub fn parse(header: &[String], line: &str) -> Self {
        let mut row = Self::new();
        for (name, value) in header.iter().zip(line.trim_end_matches(['\r', '\n']).split(',')) {
            row.set(name, value);
        }
        row
    }
}

pub fn header_line() -> String {
    CSV_COLUMNS.join(",")
}

pub fn parse_header(line: &str) -> Vec<String> {
    line.trim_end_matches(['\r', '\n'])
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

fn flag_str(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
