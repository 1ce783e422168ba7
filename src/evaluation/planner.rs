//! Action planning and executive summary.
//!
//! Recommendations are ordered by priority rank (stable within a rank),
//! given a due date and an effort estimate, and bucketed into immediate,
//! short-term and long-term actions.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::types::{
    ActionPlan, ActionPlanEntry, Category, DriftReport, ExecutiveSummary, KeyMetrics,
    MetricsSnapshot, OverallStatus, Priority, PriorityCounts, Recommendation, Section,
};

/// Days until the next scheduled evaluation.
pub const NEXT_REVIEW_DAYS: i64 = 30;

/// Base hours for categories missing from the table.
pub const DEFAULT_BASE_HOURS: u32 = 16;

/// Days from now until a task of the given priority is due.
#[must_use]
pub const fn due_in_days(priority: Priority) -> i64 {
    match priority {
        Priority::High => 7,
        Priority::Medium => 30,
        Priority::Low => 90,
    }
}

/// Effort multiplier for a priority.
#[must_use]
pub const fn priority_multiplier(priority: Priority) -> f64 {
    match priority {
        Priority::High => 1.5,
        Priority::Medium => 1.0,
        Priority::Low => 0.5,
    }
}

// ============================================================================
// EffortTable
// ============================================================================

/// Base effort in hours per recommendation category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffortTable {
    base_hours: HashMap<Category, u32>,
    default_hours: u32,
}

impl Default for EffortTable {
    fn default() -> Self {
        let base_hours = HashMap::from([
            (Category::Performance, 40),
            (Category::Drift, 24),
            (Category::Calibration, 16),
            (Category::ErrorReduction, 32),
            (Category::ConfidenceCalibration, 20),
            (Category::Maintenance, 8),
        ]);
        Self {
            base_hours,
            default_hours: DEFAULT_BASE_HOURS,
        }
    }
}

impl EffortTable {
    /// Override the base hours of one category.
    #[must_use]
    pub fn with_base_hours(mut self, category: Category, hours: u32) -> Self {
        self.base_hours.insert(category, hours);
        self
    }

    /// Base hours for a category.
    #[must_use]
    pub fn base_hours(&self, category: Category) -> u32 {
        self.base_hours
            .get(&category)
            .copied()
            .unwrap_or(self.default_hours)
    }

    /// Estimated hours: base times priority multiplier, truncated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimate(&self, recommendation: &Recommendation) -> u32 {
        let hours = f64::from(self.base_hours(recommendation.category))
            * priority_multiplier(recommendation.priority);
        hours as u32
    }
}

// ============================================================================
// ActionPlanBuilder
// ============================================================================

/// Builder turning recommendations into a dated plan.
#[derive(Debug, Clone, Default)]
pub struct ActionPlanBuilder {
    effort: EffortTable,
}

impl ActionPlanBuilder {
    /// Create a builder with a custom effort table.
    #[must_use]
    pub const fn new(effort: EffortTable) -> Self {
        Self { effort }
    }

    /// The effort table in use.
    #[must_use]
    pub const fn effort(&self) -> &EffortTable {
        &self.effort
    }

    /// Project recommendations onto a timeline starting at `now`.
    #[must_use]
    pub fn build(&self, recommendations: &[Recommendation], now: DateTime<Utc>) -> ActionPlan {
        let mut ordered: Vec<&Recommendation> = recommendations.iter().collect();
        ordered.sort_by_key(|r| r.priority.rank());

        let mut plan = ActionPlan::default();
        for rec in ordered {
            let entry = ActionPlanEntry {
                task: rec.title.clone(),
                priority: rec.priority,
                category: rec.category,
                due_date: now + Duration::days(due_in_days(rec.priority)),
                actions: rec.actions.clone(),
                estimated_effort_hours: self.effort.estimate(rec),
            };
            plan.total_estimated_hours = plan
                .total_estimated_hours
                .saturating_add(entry.estimated_effort_hours);

            match rec.priority {
                Priority::High => plan.immediate_actions.push(entry),
                Priority::Medium => plan.short_term_actions.push(entry),
                Priority::Low => plan.long_term_actions.push(entry),
            }
        }
        plan
    }
}

/// Summarize an evaluation for a quick read.
///
/// Without metrics the accuracy is taken as 0, so the status is critical.
#[must_use]
pub fn summarize(
    metrics: &Section<MetricsSnapshot>,
    drift: &DriftReport,
    recommendations: &[Recommendation],
    now: DateTime<Utc>,
) -> ExecutiveSummary {
    let key_metrics = metrics
        .as_computed()
        .map_or_else(KeyMetrics::default, |m| KeyMetrics {
            accuracy: m.accuracy,
            confidence: m.average_confidence,
            sample_size: m.sample_size,
        });

    let mut counts = PriorityCounts::default();
    for rec in recommendations {
        counts.add(rec.priority);
    }

    ExecutiveSummary {
        overall_status: OverallStatus::from_accuracy(key_metrics.accuracy),
        key_metrics,
        drift_detected: drift.drift_detected,
        recommendations_summary: counts,
        next_review_date: now + Duration::days(NEXT_REVIEW_DAYS),
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
    use crate::evaluation::types::{ConfidenceBreakdown, ConfusionMatrix, PeriodSummary};
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn rec(priority: Priority, category: Category, title: &str) -> Recommendation {
        Recommendation::new(priority, category, title, "", &["step"])
    }

    fn quiet_drift(detected: bool) -> DriftReport {
        DriftReport {
            drift_detected: detected,
            early_period: PeriodSummary {
                count: 0,
                metrics: Section::no_data("n/a"),
            },
            recent_period: PeriodSummary {
                count: 0,
                metrics: Section::no_data("n/a"),
            },
            significant_changes: Vec::new(),
            drift_magnitude: 0.0,
        }
    }

    #[test_case(Priority::High, Category::Performance => 60)]
    #[test_case(Priority::High, Category::Drift => 36)]
    #[test_case(Priority::Medium, Category::Calibration => 16)]
    #[test_case(Priority::Medium, Category::ErrorReduction => 32)]
    #[test_case(Priority::Medium, Category::ConfidenceCalibration => 20)]
    #[test_case(Priority::Low, Category::Maintenance => 4)]
    fn test_effort_estimate(priority: Priority, category: Category) -> u32 {
        EffortTable::default().estimate(&rec(priority, category, "t"))
    }

    #[test]
    fn test_effort_truncates() {
        let table = EffortTable::default().with_base_hours(Category::Maintenance, 5);
        assert_eq!(table.estimate(&rec(Priority::Low, Category::Maintenance, "t")), 2);
        assert_eq!(table.estimate(&rec(Priority::High, Category::Maintenance, "t")), 7);
    }

    #[test]
    fn test_plan_buckets_and_due_dates() {
        let recs = vec![
            rec(Priority::Medium, Category::Calibration, "calibrate"),
            rec(Priority::High, Category::Performance, "retrain"),
            rec(Priority::Low, Category::Maintenance, "monitor"),
            rec(Priority::High, Category::Drift, "drift"),
        ];
        let plan = ActionPlanBuilder::default().build(&recs, now());

        let immediate: Vec<&str> = plan.immediate_actions.iter().map(|e| e.task.as_str()).collect();
        assert_eq!(immediate, vec!["retrain", "drift"]);
        assert_eq!(plan.short_term_actions.len(), 1);
        assert_eq!(plan.long_term_actions.len(), 1);

        assert_eq!(plan.immediate_actions[0].due_date, now() + Duration::days(7));
        assert_eq!(plan.short_term_actions[0].due_date, now() + Duration::days(30));
        assert_eq!(plan.long_term_actions[0].due_date, now() + Duration::days(90));

        assert_eq!(plan.total_estimated_hours, 60 + 36 + 16 + 4);
        assert_eq!(plan.len(), recs.len());
    }

    #[test]
    fn test_plan_entries_are_priority_ordered() {
        let recs = vec![
            rec(Priority::Low, Category::Maintenance, "c"),
            rec(Priority::Medium, Category::Calibration, "b"),
            rec(Priority::High, Category::Drift, "a"),
        ];
        let plan = ActionPlanBuilder::default().build(&recs, now());
        let ranks: Vec<u8> = plan.entries().map(|e| e.priority.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_recommendations_give_empty_plan() {
        let plan = ActionPlanBuilder::default().build(&[], now());
        assert!(plan.is_empty());
        assert_eq!(plan.total_estimated_hours, 0);
    }

    #[test]
    fn test_summary_from_metrics() {
        let metrics = Section::Computed(MetricsSnapshot {
            accuracy: 0.85,
            precision: 0.8,
            recall: 0.9,
            f1_score: 0.85,
            score_correlation: 0.9,
            average_confidence: 0.82,
            confidence_analysis: ConfidenceBreakdown::default(),
            confusion_matrix: ConfusionMatrix::default(),
            sample_size: 40,
        });
        let recs = vec![
            rec(Priority::High, Category::Drift, "drift"),
            rec(Priority::Medium, Category::Calibration, "calibrate"),
        ];

        let summary = summarize(&metrics, &quiet_drift(true), &recs, now());
        assert_eq!(summary.overall_status, OverallStatus::Good);
        assert_eq!(summary.key_metrics.sample_size, 40);
        assert_eq!(summary.key_metrics.confidence, 0.82);
        assert!(summary.drift_detected);
        assert_eq!(summary.recommendations_summary.high, 1);
        assert_eq!(summary.recommendations_summary.medium, 1);
        assert_eq!(summary.recommendations_summary.total(), recs.len());
        assert_eq!(summary.next_review_date, now() + Duration::days(30));
    }

    #[test]
    fn test_summary_without_metrics_is_critical() {
        let summary = summarize(
            &Section::no_data("none"),
            &quiet_drift(false),
            &[rec(Priority::Low, Category::Maintenance, "monitor")],
            now(),
        );
        assert_eq!(summary.overall_status, OverallStatus::Critical);
        assert_eq!(summary.key_metrics, KeyMetrics::default());
        assert_eq!(summary.recommendations_summary.low, 1);
    }
}
