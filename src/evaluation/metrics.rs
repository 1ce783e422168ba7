//! Classification and calibration metrics.
//!
//! Scores are binarized at the policy's pass threshold and the model's
//! pass/fail labels are compared against the expert's.

use super::stats;
use super::types::{
    BucketStats, ConfidenceBreakdown, ConfidenceBucket, ConfusionMatrix, MetricsSnapshot, Section,
    VerificationRecord,
};
use crate::config::EvaluationPolicy;

/// Message attached to a metrics section computed from no labeled records.
pub const NO_FEEDBACK_MESSAGE: &str = "No expert feedback available for metric calculation";

/// Calculator for [`MetricsSnapshot`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator {
    policy: EvaluationPolicy,
}

impl MetricsCalculator {
    /// Create a calculator with the given policy.
    #[must_use]
    pub const fn new(policy: EvaluationPolicy) -> Self {
        Self { policy }
    }

    /// Create a calculator with the default policy.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EvaluationPolicy::default())
    }

    /// Whether a score counts as "pass".
    #[must_use]
    pub fn is_pass(&self, score: f64) -> bool {
        score >= self.policy.pass_threshold
    }

    /// Compute metrics over the eligible records of a batch.
    ///
    /// Records without expert feedback, and records whose AI score is
    /// excluded by the missing-score policy, are skipped. Returns
    /// [`Section::NoData`] when nothing is left.
    pub fn calculate<'a, I>(&self, records: I) -> Section<MetricsSnapshot>
    where
        I: IntoIterator<Item = &'a VerificationRecord>,
    {
        let mut ai_scores = Vec::new();
        let mut expert_scores = Vec::new();
        let mut confidences = Vec::new();
        let mut matrix = ConfusionMatrix::default();
        let mut buckets = [ConfusionMatrix::default(); 3];

        for record in records {
            let Some((ai, expert)) = record.scored_pair(self.policy.missing_ai_score) else {
                continue;
            };
            let expert_pass = self.is_pass(expert);
            let ai_pass = self.is_pass(ai);

            matrix.record(expert_pass, ai_pass);
            let bucket = ConfidenceBucket::classify(record.confidence_score, &self.policy);
            buckets[bucket_index(bucket)].record(expert_pass, ai_pass);

            ai_scores.push(ai);
            expert_scores.push(expert);
            confidences.push(record.confidence_score);
        }

        if ai_scores.is_empty() {
            return Section::no_data(NO_FEEDBACK_MESSAGE);
        }

        let bucket_stats = |bucket: ConfidenceBucket| {
            let cm = &buckets[bucket_index(bucket)];
            BucketStats {
                count: usize::try_from(cm.total()).unwrap_or(usize::MAX),
                accuracy: cm.accuracy(),
            }
        };

        Section::Computed(MetricsSnapshot {
            accuracy: matrix.accuracy(),
            precision: matrix.precision(),
            recall: matrix.recall(),
            f1_score: matrix.f1(),
            score_correlation: stats::pearson(&ai_scores, &expert_scores),
            average_confidence: stats::mean(&confidences),
            confidence_analysis: ConfidenceBreakdown {
                high_confidence: bucket_stats(ConfidenceBucket::High),
                medium_confidence: bucket_stats(ConfidenceBucket::Medium),
                low_confidence: bucket_stats(ConfidenceBucket::Low),
            },
            confusion_matrix: matrix,
            sample_size: ai_scores.len(),
        })
    }
}

const fn bucket_index(bucket: ConfidenceBucket) -> usize {
    match bucket {
        ConfidenceBucket::High => 0,
        ConfidenceBucket::Medium => 1,
        ConfidenceBucket::Low => 2,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::evaluation::types::{MissingScorePolicy, Score};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record(id: &str, ai: f64, expert: Option<f64>, confidence: f64) -> VerificationRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        VerificationRecord::new(id, at, ai, expert, confidence)
    }

    #[test]
    fn test_no_feedback_is_no_data() {
        let records = vec![record("a", 90.0, None, 0.9), record("b", 10.0, None, 0.2)];
        let section = MetricsCalculator::with_defaults().calculate(&records);
        assert_eq!(section, Section::no_data(NO_FEEDBACK_MESSAGE));
    }

    #[test]
    fn test_empty_batch_is_no_data() {
        let section = MetricsCalculator::with_defaults().calculate(&Vec::<VerificationRecord>::new());
        assert!(section.is_no_data());
    }

    #[test]
    fn test_perfect_agreement() {
        let records = vec![
            record("a", 95.0, Some(90.0), 0.95),
            record("b", 40.0, Some(30.0), 0.75),
            record("c", 85.0, Some(88.0), 0.5),
            record("d", 20.0, Some(10.0), 0.92),
        ];
        let snapshot = MetricsCalculator::with_defaults()
            .calculate(&records)
            .into_computed()
            .unwrap();

        assert_eq!(snapshot.accuracy, 1.0);
        assert_eq!(snapshot.precision, 1.0);
        assert_eq!(snapshot.recall, 1.0);
        assert_eq!(snapshot.f1_score, 1.0);
        assert_eq!(snapshot.sample_size, 4);
        assert_eq!(snapshot.confusion_matrix.to_rows(), [[2, 0], [0, 2]]);
        assert!(snapshot.score_correlation > 0.95);
        assert!((snapshot.average_confidence - 0.78).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let records = vec![record("a", 80.0, Some(80.0), 0.9)];
        let snapshot = MetricsCalculator::with_defaults()
            .calculate(&records)
            .into_computed()
            .unwrap();
        assert_eq!(snapshot.confusion_matrix.true_positive, 1);
    }

    #[test]
    fn test_confidence_buckets() {
        let records = vec![
            record("h1", 90.0, Some(90.0), 0.95),
            record("h2", 90.0, Some(10.0), 0.9),
            record("m1", 90.0, Some(90.0), 0.8),
            record("l1", 10.0, Some(90.0), 0.1),
            record("unlabeled", 90.0, None, 0.1),
        ];
        let snapshot = MetricsCalculator::with_defaults()
            .calculate(&records)
            .into_computed()
            .unwrap();
        let analysis = snapshot.confidence_analysis;

        assert_eq!(analysis.high_confidence.count, 2);
        assert_eq!(analysis.high_confidence.accuracy, 0.5);
        assert_eq!(analysis.medium_confidence.count, 1);
        assert_eq!(analysis.medium_confidence.accuracy, 1.0);
        assert_eq!(analysis.low_confidence.count, 1);
        assert_eq!(analysis.low_confidence.accuracy, 0.0);
        assert_eq!(
            analysis.high_confidence.count
                + analysis.medium_confidence.count
                + analysis.low_confidence.count,
            snapshot.sample_size
        );
    }

    #[test]
    fn test_empty_bucket_reports_zero() {
        let records = vec![record("a", 90.0, Some(90.0), 0.95)];
        let snapshot = MetricsCalculator::with_defaults()
            .calculate(&records)
            .into_computed()
            .unwrap();
        assert_eq!(snapshot.confidence_analysis.low_confidence, BucketStats::default());
    }

    #[test]
    fn test_missing_ai_score_policies() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let records = vec![
            VerificationRecord::new("a", at, Score::Absent, Some(90.0), 0.9),
            record("b", 90.0, Some(90.0), 0.9),
        ];

        let zero = MetricsCalculator::with_defaults()
            .calculate(&records)
            .into_computed()
            .unwrap();
        assert_eq!(zero.sample_size, 2);
        assert_eq!(zero.accuracy, 0.5);

        let exclude = MetricsCalculator::new(EvaluationPolicy {
            missing_ai_score: MissingScorePolicy::Exclude,
            ..Default::default()
        })
        .calculate(&records)
        .into_computed()
        .unwrap();
        assert_eq!(exclude.sample_size, 1);
        assert_eq!(exclude.accuracy, 1.0);
    }

    #[test]
    fn test_single_pair_has_zero_correlation() {
        let records = vec![record("a", 70.0, Some(90.0), 0.5)];
        let snapshot = MetricsCalculator::with_defaults()
            .calculate(&records)
            .into_computed()
            .unwrap();
        assert_eq!(snapshot.score_correlation, 0.0);
        assert_eq!(snapshot.precision, 0.0);
        assert_eq!(snapshot.recall, 0.0);
    }

    #[test]
    fn test_accepts_borrowed_iterators() {
        let records = vec![
            record("a", 90.0, Some(90.0), 0.9),
            record("b", 10.0, Some(90.0), 0.9),
        ];
        let refs: Vec<&VerificationRecord> = records.iter().collect();
        let from_refs = MetricsCalculator::with_defaults().calculate(refs.iter().copied());
        let from_slice = MetricsCalculator::with_defaults().calculate(&records);
        assert_eq!(from_refs, from_slice);
    }
}
