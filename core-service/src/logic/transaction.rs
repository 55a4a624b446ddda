//! Transaction record
//!
//! `TransactionRequest` is the wire shape accepted from clients.
//! `validate()` turns it into a `Transaction`, the only shape the
//! pipeline works with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_NAME_DEST, DEFAULT_NAME_ORIG};
use crate::error::EncodingError;

// ============================================================================
// TRANSACTION TYPE
// ============================================================================

/// Closed set of transaction types the classifier was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Payment,
    Transfer,
    CashOut,
    CashIn,
    Debit,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        Self::Payment,
        Self::Transfer,
        Self::CashOut,
        Self::CashIn,
        Self::Debit,
    ];

    /// Ordinal code used as model feature
    pub fn code(self) -> u8 {
        match self {
            Self::Payment => 0,
            Self::Transfer => 1,
            Self::CashOut => 2,
            Self::CashIn => 3,
            Self::Debit => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "PAYMENT",
            Self::Transfer => "TRANSFER",
            Self::CashOut => "CASH_OUT",
            Self::CashIn => "CASH_IN",
            Self::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| EncodingError::UnknownType(s.to_string()))
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// A validated transaction.
///
/// Labels are `None` until the orchestrator annotates the verdict;
/// they are never read by the feature encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub step: u32,
    pub tx_type: TransactionType,
    pub amount: f64,
    pub name_orig: String,
    pub oldbalance_org: f64,
    pub newbalance_orig: f64,
    pub name_dest: String,
    pub oldbalance_dest: f64,
    pub newbalance_dest: f64,
    pub is_fraud: Option<bool>,
    pub is_flagged_fraud: Option<bool>,
}

// ============================================================================
// WIRE REQUEST
// ============================================================================

fn default_name_orig() -> String {
    DEFAULT_NAME_ORIG.to_string()
}

fn default_name_dest() -> String {
    DEFAULT_NAME_DEST.to_string()
}

/// Transaction as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionRequest {
    pub step: u32,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    #[serde(rename = "nameOrig", default = "default_name_orig")]
    pub name_orig: String,
    #[serde(rename = "oldbalanceOrg")]
    pub oldbalance_org: f64,
    #[serde(rename = "newbalanceOrig")]
    pub newbalance_orig: f64,
    #[serde(rename = "nameDest", default = "default_name_dest")]
    pub name_dest: String,
    #[serde(rename = "oldbalanceDest")]
    pub oldbalance_dest: f64,
    #[serde(rename = "newbalanceDest")]
    pub newbalance_dest: f64,
}

impl TransactionRequest {
    /// Validate and convert into a `Transaction`
    pub fn validate(self) -> Result<Transaction, EncodingError> {
        let tx_type = self.tx_type.parse::<TransactionType>()?;

        let tx = Transaction {
            step: self.step,
            tx_type,
            amount: self.amount,
            name_orig: self.name_orig,
            oldbalance_org: self.oldbalance_org,
            newbalance_orig: self.newbalance_orig,
            name_dest: self.name_dest,
            oldbalance_dest: self.oldbalance_dest,
            newbalance_dest: self.newbalance_dest,
            is_fraud: None,
            is_flagged_fraud: None,
        };
        tx.check()?;
        Ok(tx)
    }
}

impl Transaction {
    /// Reject values the model or the event log cannot take:
    /// non-finite or negative amounts, and account ids that are empty
    /// or contain a column/row separator.
    pub fn check(&self) -> Result<(), EncodingError> {
        check_finite("amount", self.amount)?;
        if self.amount < 0.0 {
            return Err(EncodingError::Malformed {
                field: "amount",
                reason: "must be non-negative".to_string(),
            });
        }
        check_finite("oldbalanceOrg", self.oldbalance_org)?;
        check_finite("newbalanceOrig", self.newbalance_orig)?;
        check_finite("oldbalanceDest", self.oldbalance_dest)?;
        check_finite("newbalanceDest", self.newbalance_dest)?;
        check_account("nameOrig", &self.name_orig)?;
        check_account("nameDest", &self.name_dest)?;
        Ok(())
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), EncodingError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EncodingError::Malformed {
            field,
            reason: format!("not a finite number: {}", value),
        })
    }
}

/// Account ids go verbatim into the event log, so they must not
/// contain the column or row separator.
fn check_account(field: &'static str, value: &str) -> Result<(), EncodingError> {
    if value.trim().is_empty() {
        return Err(EncodingError::Malformed {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if value.contains([',', '\n', '\r']) {
        return Err(EncodingError::Malformed {
            field,
            reason: "must not contain ',' or line breaks".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_json() -> serde_json::Value {
        serde_json::json!({
            "step": 1,
            "type": "TRANSFER",
            "amount": 250000.0,
            "oldbalanceOrg": 250000.0,
            "newbalanceOrig": 0.0,
            "oldbalanceDest": 0.0,
            "newbalanceDest": 250000.0
        })
    }

    #[test]
    fn test_type_codes_are_fixed() {
        let codes: Vec<u8> = TransactionType::ALL.iter().map(|t| t.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_type_parse_is_case_insensitive() {
        assert_eq!("cash_out".parse::<TransactionType>(), Ok(TransactionType::CashOut));
        assert_eq!(" Debit ".parse::<TransactionType>(), Ok(TransactionType::Debit));
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let err = "WIRE".parse::<TransactionType>().unwrap_err();
        assert_eq!(err, EncodingError::UnknownType("WIRE".to_string()));
    }

    #[test]
    fn test_missing_accounts_use_placeholders() {
        let req: TransactionRequest = serde_json::from_value(request_json()).unwrap();
        let tx = req.validate().unwrap();
        assert_eq!(tx.name_orig, DEFAULT_NAME_ORIG);
        assert_eq!(tx.name_dest, DEFAULT_NAME_DEST);
        assert_eq!(tx.is_fraud, None);
        assert_eq!(tx.is_flagged_fraud, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut json = request_json();
        json["isFraud"] = serde_json::json!(1);
        assert!(serde_json::from_value::<TransactionRequest>(json).is_err());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let mut json = request_json();
        json.as_object_mut().unwrap().remove("amount");
        assert!(serde_json::from_value::<TransactionRequest>(json).is_err());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut req: TransactionRequest = serde_json::from_value(request_json()).unwrap();
        req.amount = -1.0;
        assert!(matches!(
            req.validate(),
            Err(EncodingError::Malformed { field: "amount", .. })
        ));
    }

    #[test]
    fn test_account_with_comma_rejected() {
        let mut req: TransactionRequest = serde_json::from_value(request_json()).unwrap();
        req.name_dest = "M1,2".to_string();
        assert!(matches!(
            req.validate(),
            Err(EncodingError::Malformed { field: "nameDest", .. })
        ));
    }
}
