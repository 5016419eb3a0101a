use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Precision / recall / F1 of one ranked list against a relevance set.
/// Every ratio with a zero denominator is defined as 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// retrieved items that are relevant
    pub true_positives: usize,
    /// requested list length (precision denominator)
    pub top_n: usize,
    /// size of the relevance set (recall denominator)
    pub relevant: usize,
}

impl Metrics {
    pub fn from_counts(true_positives: usize, top_n: usize, relevant: usize) -> Self {
        let precision = ratio(true_positives, top_n);
        let recall = ratio(true_positives, relevant);
        Self {
            precision,
            recall,
            f1: f1_score(precision, recall),
            true_positives,
            top_n,
            relevant,
        }
    }
}

#[inline]
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Harmonic mean `2pr / (p + r)`; 0.0 when both are 0
#[inline]
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    let sum = precision + recall;
    if sum > 0.0 {
        2.0 * precision * recall / sum
    } else {
        0.0
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Precision: {:.3} ({}/{})", self.precision, self.true_positives, self.top_n)?;
        writeln!(f, "Recall: {:.3} ({}/{})", self.recall, self.true_positives, self.relevant)?;
        write!(f, "F1-Score: {:.3}", self.f1)
    }
}
