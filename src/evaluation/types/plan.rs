//! Action plan and executive summary types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::recommendation::{Category, Priority};

/// A recommendation projected onto the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlanEntry {
    /// Recommendation title.
    pub task: String,
    /// Urgency.
    pub priority: Priority,
    /// Area addressed.
    pub category: Category,
    /// When the task is due.
    pub due_date: DateTime<Utc>,
    /// Remediation steps.
    pub actions: Vec<String>,
    /// Estimated effort in hours.
    pub estimated_effort_hours: u32,
}

/// Prioritized, dated plan bucketed by urgency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    /// High-priority entries.
    pub immediate_actions: Vec<ActionPlanEntry>,
    /// Medium-priority entries.
    pub short_term_actions: Vec<ActionPlanEntry>,
    /// Low-priority entries.
    pub long_term_actions: Vec<ActionPlanEntry>,
    /// Sum of all effort estimates.
    pub total_estimated_hours: u32,
}

impl ActionPlan {
    /// All entries in priority order.
    pub fn entries(&self) -> impl Iterator<Item = &ActionPlanEntry> {
        self.immediate_actions
            .iter()
            .chain(&self.short_term_actions)
            .chain(&self.long_term_actions)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.immediate_actions.len() + self.short_term_actions.len() + self.long_term_actions.len()
    }

    /// Whether the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Overall health classification derived from accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Accuracy at least 0.9.
    Excellent,
    /// Accuracy at least 0.8.
    Good,
    /// Accuracy at least 0.7.
    NeedsImprovement,
    /// Anything lower, including no data.
    Critical,
}

impl OverallStatus {
    /// Classify an accuracy value.
    #[must_use]
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 0.9 {
            Self::Excellent
        } else if accuracy >= 0.8 {
            Self::Good
        } else if accuracy >= 0.7 {
            Self::NeedsImprovement
        } else {
            Self::Critical
        }
    }
}

/// Headline metrics for the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    /// Accuracy, 0 without data.
    pub accuracy: f64,
    /// Mean confidence, 0 without data.
    pub confidence: f64,
    /// Expert-labeled records evaluated.
    pub sample_size: usize,
}

/// Number of recommendations per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    /// High-priority count.
    pub high: usize,
    /// Medium-priority count.
    pub medium: usize,
    /// Low-priority count.
    pub low: usize,
}

impl PriorityCounts {
    /// Count one recommendation.
    pub fn add(&mut self, priority: Priority) {
        match priority {
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
        }
    }

    /// Sum over all priorities.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// One-glance summary of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    /// Health classification.
    pub overall_status: OverallStatus,
    /// Headline metrics.
    pub key_metrics: KeyMetrics,
    /// Whether drift was detected.
    pub drift_detected: bool,
    /// Recommendation counts per priority.
    pub recommendations_summary: PriorityCounts,
    /// When the model should be evaluated again.
    pub next_review_date: DateTime<Utc>,
}
