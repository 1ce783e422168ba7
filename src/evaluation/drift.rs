//! Temporal drift detection.
//!
//! The batch is ordered by `created_at` and split at its midpoint. Metrics
//! are recomputed on each half and every tracked metric is compared; a
//! change strictly greater than the drift threshold counts as drift.

use super::metrics::MetricsCalculator;
use super::types::{DriftReport, MetricChange, PeriodSummary, TrackedMetric, VerificationRecord};
use crate::config::EvaluationPolicy;

/// Split a batch into its chronologically earlier and later half.
///
/// Ties on `created_at` are broken by id so the split does not depend on
/// input order. The early half holds `len / 2` records; an odd record out
/// lands in the recent half.
#[must_use]
pub fn split_chronologically(
    records: &[VerificationRecord],
) -> (Vec<&VerificationRecord>, Vec<&VerificationRecord>) {
    let mut ordered: Vec<&VerificationRecord> = records.iter().collect();
    ordered.sort_by(|a, b| a.chronological_cmp(b));
    let recent = ordered.split_off(ordered.len() / 2);
    (ordered, recent)
}

/// Detector comparing early and recent performance within one batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftDetector {
    policy: EvaluationPolicy,
    calculator: MetricsCalculator,
}

impl DriftDetector {
    /// Create a detector with the given policy.
    #[must_use]
    pub const fn new(policy: EvaluationPolicy) -> Self {
        Self {
            policy,
            calculator: MetricsCalculator::new(policy),
        }
    }

    /// Compare the two halves of a batch.
    ///
    /// Metrics are compared only when both halves have labeled records;
    /// otherwise no drift is reported.
    #[must_use]
    pub fn detect(&self, records: &[VerificationRecord]) -> DriftReport {
        let (early, recent) = split_chronologically(records);

        let early_period = PeriodSummary {
            count: early.len(),
            metrics: self.calculator.calculate(early.iter().copied()),
        };
        let recent_period = PeriodSummary {
            count: recent.len(),
            metrics: self.calculator.calculate(recent.iter().copied()),
        };

        let significant_changes: Vec<MetricChange> = match (
            early_period.metrics.as_computed(),
            recent_period.metrics.as_computed(),
        ) {
            (Some(before), Some(after)) => TrackedMetric::ALL
                .iter()
                .map(|&metric| {
                    MetricChange::between(metric, metric.value_in(before), metric.value_in(after))
                })
                .filter(|change| change.absolute_change > self.policy.drift_threshold)
                .collect(),
            _ => Vec::new(),
        };

        let drift_magnitude = significant_changes
            .iter()
            .map(|c| c.absolute_change)
            .fold(0.0, f64::max);
        let drift_detected = !significant_changes.is_empty();

        if drift_detected {
            tracing::warn!(
                magnitude = drift_magnitude,
                metrics = ?significant_changes.iter().map(|c| c.metric.as_str()).collect::<Vec<_>>(),
                "Performance drift detected"
            );
        }

        DriftReport {
            drift_detected,
            early_period,
            recent_period,
            significant_changes,
            drift_magnitude,
        }
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
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(minutes: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn labeled(id: &str, minute: i64, ai: f64, expert: f64) -> VerificationRecord {
        VerificationRecord::new(id, at(minute), ai, Some(expert), 0.9)
    }

    #[test]
    fn test_split_sizes() {
        let records: Vec<_> = (0..5)
            .map(|i| labeled(&format!("r{i}"), i, 90.0, 90.0))
            .collect();
        let (early, recent) = split_chronologically(&records);
        assert_eq!(early.len(), 2);
        assert_eq!(recent.len(), 3);
    }

    #[test]
    fn test_split_orders_by_time_then_id() {
        let records = vec![
            labeled("late", 10, 90.0, 90.0),
            labeled("b", 0, 90.0, 90.0),
            labeled("a", 0, 90.0, 90.0),
            labeled("mid", 5, 90.0, 90.0),
        ];
        let (early, recent) = split_chronologically(&records);
        let early_ids: Vec<&str> = early.iter().map(|r| r.id.as_str()).collect();
        let recent_ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(early_ids, vec!["a", "b"]);
        assert_eq!(recent_ids, vec!["mid", "late"]);
    }

    #[test]
    fn test_split_counts_unlabeled_records() {
        let records = vec![
            VerificationRecord::new("u1", at(0), 90.0, None, 0.9),
            VerificationRecord::new("u2", at(1), 90.0, None, 0.9),
            labeled("l1", 2, 90.0, 90.0),
            labeled("l2", 3, 90.0, 90.0),
        ];
        let report = DriftDetector::default().detect(&records);
        assert_eq!(report.early_period.count, 2);
        assert!(report.early_period.metrics.is_no_data());
        assert!(!report.recent_period.metrics.is_no_data());
        assert!(!report.drift_detected);
        assert!(report.significant_changes.is_empty());
        assert_eq!(report.drift_magnitude, 0.0);
    }

    #[test]
    fn test_stable_batch_has_no_drift() {
        let records: Vec<_> = (0..20)
            .map(|i| labeled(&format!("r{i:02}"), i, 90.0, 85.0))
            .collect();
        let report = DriftDetector::default().detect(&records);
        assert!(!report.drift_detected);
        assert_eq!(report.early_period.count, 10);
        assert_eq!(report.recent_period.count, 10);
    }

    #[test]
    fn test_accuracy_drop_is_detected() {
        // Early: all agree. Recent: half disagree.
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(labeled(&format!("e{i}"), i, 90.0, 90.0));
        }
        for i in 10..20 {
            let ai = if i % 2 == 0 { 90.0 } else { 10.0 };
            records.push(labeled(&format!("r{i}"), i, ai, 90.0));
        }

        let report = DriftDetector::default().detect(&records);
        assert!(report.drift_detected);

        let accuracy = report.change_for(TrackedMetric::Accuracy).unwrap();
        assert_eq!(accuracy.early_value, 1.0);
        assert_eq!(accuracy.recent_value, 0.5);
        assert!((accuracy.change + 0.5).abs() < 1e-12);
        assert!((accuracy.percent_change + 50.0).abs() < 1e-9);
        assert!(report.drift_magnitude >= 0.5);
        assert!(report.change_for(TrackedMetric::Confidence).is_none());
    }

    #[test]
    fn test_change_at_threshold_is_not_drift() {
        // Accuracy moves from 1.0 to 0.9, which does not exceed 0.1.
        let policy = EvaluationPolicy {
            drift_threshold: 0.1,
            ..Default::default()
        };
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(labeled(&format!("e{i}"), i, 90.0, 90.0));
        }
        for i in 10..20 {
            let ai = if i == 10 { 10.0 } else { 90.0 };
            records.push(labeled(&format!("r{i}"), i, ai, 90.0));
        }

        let report = DriftDetector::new(policy).detect(&records);
        assert!(report.change_for(TrackedMetric::Accuracy).is_none());
    }

    #[test]
    fn test_magnitude_is_max_of_changes() {
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(VerificationRecord::new(
                format!("e{i}"),
                at(i),
                90.0,
                Some(90.0),
                0.95,
            ));
        }
        for i in 10..20 {
            let ai = if i % 2 == 0 { 90.0 } else { 10.0 };
            records.push(VerificationRecord::new(
                format!("r{i}"),
                at(i),
                ai,
                Some(90.0),
                0.75,
            ));
        }

        let report = DriftDetector::default().detect(&records);
        let max = report
            .significant_changes
            .iter()
            .map(|c| c.absolute_change)
            .fold(0.0, f64::max);
        assert_eq!(report.drift_magnitude, max);
        assert!(report.change_for(TrackedMetric::Confidence).is_some());
    }

    #[test]
    fn test_empty_batch() {
        let report = DriftDetector::default().detect(&[]);
        assert!(!report.drift_detected);
        assert_eq!(report.early_period.count, 0);
        assert_eq!(report.recent_period.count, 0);
    }
}
