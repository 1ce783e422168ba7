//! Drift comparison types.

use serde::{Deserialize, Serialize};

use super::metrics::MetricsSnapshot;
use super::section::Section;

/// Metrics compared between the early and recent period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedMetric {
    /// Binary accuracy.
    Accuracy,
    /// Mean self-reported confidence.
    Confidence,
    /// Pearson correlation of raw scores.
    ScoreCorrelation,
}

impl TrackedMetric {
    /// All tracked metrics in comparison order.
    pub const ALL: [Self; 3] = [Self::Accuracy, Self::Confidence, Self::ScoreCorrelation];

    /// Read this metric from a snapshot.
    #[must_use]
    pub const fn value_in(self, snapshot: &MetricsSnapshot) -> f64 {
        match self {
            Self::Accuracy => snapshot.accuracy,
            Self::Confidence => snapshot.average_confidence,
            Self::ScoreCorrelation => snapshot.score_correlation,
        }
    }

    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Confidence => "confidence",
            Self::ScoreCorrelation => "score_correlation",
        }
    }
}

impl std::fmt::Display for TrackedMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked metric whose change between periods exceeded the drift threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    /// Which metric moved.
    pub metric: TrackedMetric,
    /// Value in the early period.
    pub early_value: f64,
    /// Value in the recent period.
    pub recent_value: f64,
    /// Signed change, `recent - early`.
    pub change: f64,
    /// `|recent - early|`.
    pub absolute_change: f64,
    /// Change relative to the early value in percent.
    ///
    /// Reported as 0 when the early value is 0; read `absolute_change` in that case.
    pub percent_change: f64,
}

impl MetricChange {
    /// Compare two values of a metric.
    #[must_use]
    pub fn between(metric: TrackedMetric, early_value: f64, recent_value: f64) -> Self {
        let change = recent_value - early_value;
        let percent_change = if early_value == 0.0 {
            0.0
        } else {
            change / early_value * 100.0
        };
        Self {
            metric,
            early_value,
            recent_value,
            change,
            absolute_change: change.abs(),
            percent_change,
        }
    }
}

/// One half of a drift comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Records in the period, with or without feedback.
    pub count: usize,
    /// Metrics over the period's expert-labeled records.
    pub metrics: Section<MetricsSnapshot>,
}

/// Comparison of the early and recent half of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Whether any tracked metric changed by more than the drift threshold.
    pub drift_detected: bool,
    /// Chronologically earlier half.
    pub early_period: PeriodSummary,
    /// Chronologically later half.
    pub recent_period: PeriodSummary,
    /// Metrics that moved past the threshold, in tracking order.
    pub significant_changes: Vec<MetricChange>,
    /// Largest absolute change among `significant_changes`, or 0.
    pub drift_magnitude: f64,
}

impl DriftReport {
    /// Find the change recorded for a metric.
    #[must_use]
    pub fn change_for(&self, metric: TrackedMetric) -> Option<&MetricChange> {
        self.significant_changes.iter().find(|c| c.metric == metric)
    }
}
