//! Decision thresholds
//!
//! Both cuts are fixed constants; there is no per-deployment calibration.

use super::inference::Verdict;
use crate::constants::{FLAG_THRESHOLD, FRAUD_THRESHOLD};

/// Primary cut: strictly above 0.5
pub fn is_fraud_probability(probability: f32) -> bool {
    probability > FRAUD_THRESHOLD
}

/// Secondary, stricter cut. Never true for a non-fraud verdict.
pub fn is_flagged(verdict: &Verdict) -> bool {
    verdict.is_fraud && verdict.score >= FLAG_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::inference::ScoreMode;

    fn verdict(is_fraud: bool, score: f32) -> Verdict {
        Verdict { is_fraud, score, mode: ScoreMode::Probability }
    }

    #[test]
    fn test_flag_requires_fraud_and_score() {
        assert!(is_flagged(&verdict(true, 0.65)));
        assert!(is_flagged(&verdict(true, 0.99)));
        assert!(!is_flagged(&verdict(true, 0.64)));
    }

    #[test]
    fn test_flag_never_set_without_fraud() {
        for score in [0.0, 0.5, 0.65, 0.9, 1.0] {
            assert!(!is_flagged(&verdict(false, score)));
        }
    }

    #[test]
    fn test_fraud_cut() {
        assert!(!is_fraud_probability(0.5));
        assert!(is_fraud_probability(0.51));
    }
}
