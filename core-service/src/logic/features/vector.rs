//! Feature Vector - model input for one transaction
//!
//! Recomputed per request, never persisted.

use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
use crate::logic::transaction::Transaction;

/// Versioned feature vector in `FEATURE_LAYOUT` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Encode a transaction. Only the 7 numeric inputs are read;
    /// label fields are ignored whatever their state.
    pub fn encode(tx: &Transaction) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: [
                tx.step as f32,
                f32::from(tx.tx_type.code()),
                tx.amount as f32,
                tx.oldbalance_org as f32,
                tx.newbalance_orig as f32,
                tx.oldbalance_dest as f32,
                tx.newbalance_dest as f32,
            ],
        }
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).map(|i| self.values[i])
    }

    /// Named values for debug logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::transaction::TransactionType;

    fn tx(tx_type: TransactionType) -> Transaction {
        Transaction {
            step: 7,
            tx_type,
            amount: 1500.5,
            name_orig: "C1".into(),
            oldbalance_org: 2000.0,
            newbalance_orig: 499.5,
            name_dest: "M1".into(),
            oldbalance_dest: 10.0,
            newbalance_dest: 1510.5,
            is_fraud: None,
            is_flagged_fraud: None,
        }
    }

    #[test]
    fn test_encode_order() {
        let v = FeatureVector::encode(&tx(TransactionType::CashOut));
        assert_eq!(v.values, [7.0, 2.0, 1500.5, 2000.0, 499.5, 10.0, 1510.5]);
        assert_eq!(v.get_by_name("type_code"), Some(2.0));
    }

    #[test]
    fn test_labels_do_not_change_encoding() {
        let plain = tx(TransactionType::Transfer);
        let mut labelled = plain.clone();
        labelled.is_fraud = Some(true);
        labelled.is_flagged_fraud = Some(true);

        assert_eq!(FeatureVector::encode(&plain), FeatureVector::encode(&labelled));
    }

    #[test]
    fn test_log_entry_has_all_names() {
        let entry = FeatureVector::encode(&tx(TransactionType::Debit)).to_log_entry();
        let named = entry["named_values"].as_object().unwrap();
        assert_eq!(named.len(), FEATURE_COUNT);
        assert_eq!(named["type_code"], serde_json::json!(4.0));
    }
}
