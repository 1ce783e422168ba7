//! Classification and calibration metric types.

use serde::{Deserialize, Serialize};

use crate::config::EvaluationPolicy;

// ============================================================================
// ConfusionMatrix
// ============================================================================

/// Binary confusion matrix with "pass" as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Expert fail, model fail.
    pub true_negative: u64,
    /// Expert fail, model pass.
    pub false_positive: u64,
    /// Expert pass, model fail.
    pub false_negative: u64,
    /// Expert pass, model pass.
    pub true_positive: u64,
}

// Ratios over counts bounded by the batch size.
#[allow(clippy::cast_precision_loss)]
impl ConfusionMatrix {
    /// Count one labeled pair.
    pub fn record(&mut self, expert_pass: bool, ai_pass: bool) {
        match (expert_pass, ai_pass) {
            (false, false) => self.true_negative += 1,
            (false, true) => self.false_positive += 1,
            (true, false) => self.false_negative += 1,
            (true, true) => self.true_positive += 1,
        }
    }

    /// Total number of counted pairs.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    /// Fraction of pairs where model and expert agree, 0 when empty.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// TP / (TP + FP), 0 when the model never predicts "pass".
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// TP / (TP + FN), 0 when the expert never assigns "pass".
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// Harmonic mean of precision and recall, 0 when both are 0.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Rows indexed by expert label, columns by model label: `[[TN, FP], [FN, TP]]`.
    #[must_use]
    pub const fn to_rows(&self) -> [[u64; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// ============================================================================
// Confidence buckets
// ============================================================================

/// Partition of the model's self-reported confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    /// At or above `confidence_high`.
    High,
    /// In `[confidence_medium, confidence_high)`.
    Medium,
    /// Below `confidence_medium`.
    Low,
}

impl ConfidenceBucket {
    /// Classify a confidence value under the given policy.
    #[must_use]
    pub fn classify(confidence: f64, policy: &EvaluationPolicy) -> Self {
        if confidence >= policy.confidence_high {
            Self::High
        } else if confidence >= policy.confidence_medium {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Record count and accuracy within one confidence bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    /// Records in the bucket.
    pub count: usize,
    /// Accuracy within the bucket, 0 when empty.
    pub accuracy: f64,
}

/// Accuracy stratified by confidence bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// High-confidence bucket.
    pub high_confidence: BucketStats,
    /// Medium-confidence bucket.
    pub medium_confidence: BucketStats,
    /// Low-confidence bucket.
    pub low_confidence: BucketStats,
}

impl ConfidenceBreakdown {
    /// Stats for a single bucket.
    #[must_use]
    pub const fn bucket(&self, bucket: ConfidenceBucket) -> &BucketStats {
        match bucket {
            ConfidenceBucket::High => &self.high_confidence,
            ConfidenceBucket::Medium => &self.medium_confidence,
            ConfidenceBucket::Low => &self.low_confidence,
        }
    }
}

// ============================================================================
// MetricsSnapshot
// ============================================================================

/// Classification and calibration metrics over one fixed sub-batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Binary accuracy of model vs expert pass/fail labels.
    pub accuracy: f64,
    /// Binary precision ("pass" positive).
    pub precision: f64,
    /// Binary recall ("pass" positive).
    pub recall: f64,
    /// Binary F1.
    pub f1_score: f64,
    /// Pearson correlation of raw model and expert scores.
    pub score_correlation: f64,
    /// Mean self-reported confidence.
    pub average_confidence: f64,
    /// Accuracy per confidence bucket.
    pub confidence_analysis: ConfidenceBreakdown,
    /// Pass/fail confusion matrix.
    pub confusion_matrix: ConfusionMatrix,
    /// Number of records the metrics were computed from.
    pub sample_size: usize,
}
