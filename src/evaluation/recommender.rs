//! Rule-based recommendation engine.
//!
//! Rules are evaluated in table order and every rule that fires emits one
//! recommendation. When nothing fires a single low-priority maintenance
//! recommendation is returned, so the output is never empty.
//!
//! A rule whose input section has no data never fires.

use super::types::{
    Category, DriftReport, ErrorAnalysis, MetricsSnapshot, Priority, Recommendation, Section,
};
use crate::config::EvaluationPolicy;

/// Everything a rule may inspect.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Metrics over the whole batch, if any.
    pub metrics: Option<&'a MetricsSnapshot>,
    /// Drift comparison.
    pub drift: &'a DriftReport,
    /// Residual analysis, if any.
    pub errors: Option<&'a ErrorAnalysis>,
    /// Active thresholds.
    pub policy: &'a EvaluationPolicy,
}

/// One entry of the rules table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Identifier used in logs.
    pub name: &'static str,
    /// Whether the rule applies.
    pub trigger: fn(&RuleContext<'_>) -> bool,
    /// The recommendation emitted when it does.
    pub build: fn(&RuleContext<'_>) -> Recommendation,
}

/// Built-in rules in evaluation order.
pub const DEFAULT_RULES: &[Rule] = &[
    Rule {
        name: "low_accuracy",
        trigger: |ctx| {
            ctx.metrics
                .is_some_and(|m| m.accuracy < ctx.policy.min_accuracy)
        },
        build: |ctx| {
            let accuracy = ctx.metrics.map_or(0.0, |m| m.accuracy);
            Recommendation::new(
                Priority::High,
                Category::Performance,
                "Low Accuracy Detected",
                format!(
                    "Model accuracy ({:.2}%) is below the acceptable threshold ({:.0}%)",
                    accuracy * 100.0,
                    ctx.policy.min_accuracy * 100.0
                ),
                &[
                    "Retrain the model with additional data",
                    "Review and improve annotation quality",
                    "Consider adjusting decision thresholds",
                ],
            )
        },
    },
    Rule {
        name: "low_correlation",
        trigger: |ctx| {
            ctx.metrics
                .is_some_and(|m| m.score_correlation < ctx.policy.min_correlation)
        },
        build: |ctx| {
            let correlation = ctx.metrics.map_or(0.0, |m| m.score_correlation);
            Recommendation::new(
                Priority::Medium,
                Category::Calibration,
                "Low Correlation With Experts",
                format!("Correlation with expert scores ({correlation:.3}) is low"),
                &[
                    "Review evaluation criteria with experts",
                    "Implement score calibration",
                    "Increase diversity of training data",
                ],
            )
        },
    },
    Rule {
        name: "drift",
        trigger: |ctx| ctx.drift.drift_detected,
        build: |ctx| {
            Recommendation::new(
                Priority::High,
                Category::Drift,
                "Performance Degradation Detected",
                format!(
                    "Drift detected with magnitude {:.3}",
                    ctx.drift.drift_magnitude
                ),
                &[
                    "Schedule immediate retraining",
                    "Investigate changes in input data",
                    "Increase monitoring frequency",
                ],
            )
        },
    },
    Rule {
        name: "large_errors",
        trigger: |ctx| {
            ctx.errors
                .is_some_and(|e| e.large_errors.percentage > ctx.policy.large_error_alert_pct)
        },
        build: |ctx| {
            let percentage = ctx.errors.map_or(0.0, |e| e.large_errors.percentage);
            Recommendation::new(
                Priority::Medium,
                Category::ErrorReduction,
                "High Share of Large Errors",
                format!(
                    "{percentage:.1}% of predictions are off by more than {} points",
                    ctx.policy.large_error_threshold
                ),
                &[
                    "Analyze error cases to identify patterns",
                    "Improve data preprocessing",
                    "Consider a model ensemble",
                ],
            )
        },
    },
    Rule {
        name: "high_confidence_errors",
        trigger: |ctx| ctx.errors.is_some_and(ErrorAnalysis::has_high_confidence_errors),
        build: |_| {
            Recommendation::new(
                Priority::Medium,
                Category::ConfidenceCalibration,
                "High-Confidence Errors",
                "The model is highly confident in incorrect predictions",
                &[
                    "Implement confidence calibration",
                    "Review the model architecture",
                    "Add regularization to reduce overconfidence",
                ],
            )
        },
    },
];

/// The recommendation returned when no rule fires.
#[must_use]
pub fn maintenance_recommendation() -> Recommendation {
    Recommendation::new(
        Priority::Low,
        Category::Maintenance,
        "Satisfactory Performance",
        "The model is operating within acceptable parameters",
        &[
            "Continue regular monitoring",
            "Collect more expert feedback",
            "Consider minor optimizations",
        ],
    )
}

/// Engine applying a rules table to an evaluation.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    policy: EvaluationPolicy,
    rules: Vec<Rule>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(EvaluationPolicy::default())
    }
}

impl RecommendationEngine {
    /// Create an engine with the built-in rules.
    #[must_use]
    pub fn new(policy: EvaluationPolicy) -> Self {
        Self {
            policy,
            rules: DEFAULT_RULES.to_vec(),
        }
    }

    /// Append a rule after the existing ones.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Generate recommendations, never empty.
    #[must_use]
    pub fn recommend(
        &self,
        metrics: &Section<MetricsSnapshot>,
        drift: &DriftReport,
        errors: &Section<ErrorAnalysis>,
    ) -> Vec<Recommendation> {
        let ctx = RuleContext {
            metrics: metrics.as_computed(),
            drift,
            errors: errors.as_computed(),
            policy: &self.policy,
        };

        let mut recommendations: Vec<Recommendation> = self
            .rules
            .iter()
            .filter(|rule| (rule.trigger)(&ctx))
            .map(|rule| {
                tracing::debug!(rule = rule.name, "Recommendation rule fired");
                (rule.build)(&ctx)
            })
            .collect();

        if recommendations.is_empty() {
            recommendations.push(maintenance_recommendation());
        }
        recommendations
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
    use crate::evaluation::types::{
        ConfidenceBreakdown, ConfusionMatrix, ErrorDistribution, ErrorPattern, LargeErrorSummary,
        OutlierSummary, PeriodSummary,
    };
    use pretty_assertions::assert_eq;

    fn metrics(accuracy: f64, correlation: f64) -> Section<MetricsSnapshot> {
        Section::Computed(MetricsSnapshot {
            accuracy,
            precision: accuracy,
            recall: accuracy,
            f1_score: accuracy,
            score_correlation: correlation,
            average_confidence: 0.85,
            confidence_analysis: ConfidenceBreakdown::default(),
            confusion_matrix: ConfusionMatrix::default(),
            sample_size: 100,
        })
    }

    fn drift(detected: bool) -> DriftReport {
        DriftReport {
            drift_detected: detected,
            early_period: PeriodSummary {
                count: 50,
                metrics: Section::no_data("n/a"),
            },
            recent_period: PeriodSummary {
                count: 50,
                metrics: Section::no_data("n/a"),
            },
            significant_changes: Vec::new(),
            drift_magnitude: if detected { 0.1 } else { 0.0 },
        }
    }

    fn errors(percentage: f64, patterns: Vec<ErrorPattern>) -> Section<ErrorAnalysis> {
        Section::Computed(ErrorAnalysis {
            total_errors: 100,
            mean_absolute_error: 5.0,
            median_absolute_error: 4.0,
            std_error: 2.0,
            max_error: 40.0,
            outliers: OutlierSummary {
                count: 0,
                threshold: 10.0,
                examples: Vec::new(),
            },
            large_errors: LargeErrorSummary {
                count: 0,
                percentage,
                common_patterns: patterns,
            },
            error_distribution: ErrorDistribution::default(),
        })
    }

    fn categories(recs: &[Recommendation]) -> Vec<Category> {
        recs.iter().map(|r| r.category).collect()
    }

    #[test]
    fn test_healthy_model_gets_maintenance_only() {
        let recs = RecommendationEngine::default().recommend(
            &metrics(0.95, 0.95),
            &drift(false),
            &errors(0.0, Vec::new()),
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, Category::Maintenance);
        assert_eq!(recs[0].priority, Priority::Low);
        assert_eq!(recs[0].actions.len(), 3);
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let patterns = vec![ErrorPattern::HighConfidenceErrors {
            count: 3,
            avg_error: 30.0,
            avg_confidence: 0.9,
        }];
        let recs = RecommendationEngine::default().recommend(
            &metrics(0.6, 0.4),
            &drift(true),
            &errors(25.0, patterns),
        );
        assert_eq!(
            categories(&recs),
            vec![
                Category::Performance,
                Category::Calibration,
                Category::Drift,
                Category::ErrorReduction,
                Category::ConfidenceCalibration,
            ]
        );
        let priorities: Vec<Priority> = recs.iter().map(|r| r.priority).collect();
        assert_eq!(
            priorities,
            vec![
                Priority::High,
                Priority::Medium,
                Priority::High,
                Priority::Medium,
                Priority::Medium,
            ]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Exactly at the floors: no rule fires.
        let recs = RecommendationEngine::default().recommend(
            &metrics(0.8, 0.7),
            &drift(false),
            &errors(15.0, Vec::new()),
        );
        assert_eq!(categories(&recs), vec![Category::Maintenance]);
    }

    #[test]
    fn test_no_data_sections_do_not_fire() {
        let recs = RecommendationEngine::default().recommend(
            &Section::no_data("none"),
            &drift(false),
            &Section::no_data("none"),
        );
        assert_eq!(categories(&recs), vec![Category::Maintenance]);
    }

    #[test]
    fn test_drift_only() {
        let recs = RecommendationEngine::default().recommend(
            &metrics(0.9, 0.9),
            &drift(true),
            &errors(5.0, Vec::new()),
        );
        assert_eq!(categories(&recs), vec![Category::Drift]);
        assert!(recs[0].description.contains("0.100"));
    }

    #[test]
    fn test_bias_patterns_alone_do_not_fire() {
        let patterns = vec![ErrorPattern::SystematicOverestimation {
            count: 5,
            avg_overestimation: 30.0,
        }];
        let recs = RecommendationEngine::default().recommend(
            &metrics(0.9, 0.9),
            &drift(false),
            &errors(10.0, patterns),
        );
        assert_eq!(categories(&recs), vec![Category::Maintenance]);
    }

    #[test]
    fn test_policy_controls_floors() {
        let engine = RecommendationEngine::new(EvaluationPolicy {
            min_accuracy: 0.97,
            ..Default::default()
        });
        let recs = engine.recommend(&metrics(0.95, 0.95), &drift(false), &errors(0.0, Vec::new()));
        assert_eq!(categories(&recs), vec![Category::Performance]);
        assert!(recs[0].description.contains("95.00%"));
        assert!(recs[0].description.contains("97%"));
    }

    #[test]
    fn test_custom_rule_is_appended() {
        let engine = RecommendationEngine::default().with_rule(Rule {
            name: "small_sample",
            trigger: |ctx| ctx.metrics.is_some_and(|m| m.sample_size < 500),
            build: |_| {
                Recommendation::new(
                    Priority::Low,
                    Category::Maintenance,
                    "Collect More Feedback",
                    "Sample is small",
                    &["Request more expert reviews"],
                )
            },
        });
        assert_eq!(engine.rules().len(), DEFAULT_RULES.len() + 1);

        let recs = engine.recommend(&metrics(0.6, 0.95), &drift(false), &errors(0.0, Vec::new()));
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Low Accuracy Detected", "Collect More Feedback"]);
    }
}
