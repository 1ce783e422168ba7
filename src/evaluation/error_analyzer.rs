//! Residual analysis over expert-labeled records.

use super::stats;
use super::types::{
    ErrorAnalysis, ErrorDistribution, ErrorPattern, ErrorRecord, LargeErrorSummary,
    OutlierSummary, Section, VerificationRecord,
};
use crate::config::EvaluationPolicy;

/// Message attached to an error section computed from no labeled records.
pub const NO_ERRORS_MESSAGE: &str = "No expert feedback available for error analysis";

/// Outliers kept as examples in the report.
pub const MAX_OUTLIER_EXAMPLES: usize = 3;

/// Analyzer computing residual statistics, outliers and error patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorAnalyzer {
    policy: EvaluationPolicy,
}

impl ErrorAnalyzer {
    /// Create an analyzer with the given policy.
    #[must_use]
    pub const fn new(policy: EvaluationPolicy) -> Self {
        Self { policy }
    }

    /// Build the per-record errors for every eligible record, in input order.
    #[must_use]
    pub fn error_records(&self, records: &[VerificationRecord]) -> Vec<ErrorRecord> {
        records
            .iter()
            .filter_map(|record| {
                let (ai, expert) = record.scored_pair(self.policy.missing_ai_score)?;
                Some(ErrorRecord {
                    verification_id: record.id.clone(),
                    ai_score: ai,
                    expert_score: expert,
                    error: (ai - expert).abs(),
                    confidence: record.confidence_score,
                    created_at: record.created_at,
                    feedback: record.detailed_feedback.clone(),
                })
            })
            .collect()
    }

    /// Analyze the residuals of a batch.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn analyze(&self, records: &[VerificationRecord]) -> Section<ErrorAnalysis> {
        let errors = self.error_records(records);
        if errors.is_empty() {
            return Section::no_data(NO_ERRORS_MESSAGE);
        }

        let values: Vec<f64> = errors.iter().map(|e| e.error).collect();
        let sorted = stats::sorted(&values);

        let error_distribution = ErrorDistribution {
            q25: stats::percentile(&sorted, 25.0),
            q50: stats::percentile(&sorted, 50.0),
            q75: stats::percentile(&sorted, 75.0),
            q90: stats::percentile(&sorted, 90.0),
        };

        let threshold = self.tukey_fence(&error_distribution);
        let outlier_records: Vec<&ErrorRecord> =
            errors.iter().filter(|e| e.error > threshold).collect();
        let outliers = OutlierSummary {
            count: outlier_records.len(),
            threshold,
            examples: outlier_records
                .into_iter()
                .take(MAX_OUTLIER_EXAMPLES)
                .cloned()
                .collect(),
        };

        let large: Vec<&ErrorRecord> = errors
            .iter()
            .filter(|e| e.error > self.policy.large_error_threshold)
            .collect();
        let percentage = large.len() as f64 / errors.len() as f64 * 100.0;
        let large_errors = LargeErrorSummary {
            count: large.len(),
            percentage,
            common_patterns: self.identify_patterns(&large),
        };

        tracing::debug!(
            total = errors.len(),
            outliers = outliers.count,
            large = large_errors.count,
            "Error analysis complete"
        );

        Section::Computed(ErrorAnalysis {
            total_errors: errors.len(),
            mean_absolute_error: stats::mean(&values),
            median_absolute_error: stats::median(&sorted),
            std_error: stats::std_dev(&values),
            max_error: sorted.last().copied().unwrap_or(0.0),
            outliers,
            large_errors,
            error_distribution,
        })
    }

    /// Upper Tukey fence, `Q75 + k * IQR`.
    #[must_use]
    pub fn tukey_fence(&self, distribution: &ErrorDistribution) -> f64 {
        distribution.q75 + self.policy.outlier_iqr_multiplier * distribution.iqr()
    }

    /// Detect recurring shapes among the large errors.
    ///
    /// The checks are independent: any subset of patterns may fire.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn identify_patterns(&self, large_errors: &[&ErrorRecord]) -> Vec<ErrorPattern> {
        let mut patterns = Vec::new();
        if large_errors.is_empty() {
            return patterns;
        }

        let confident: Vec<&ErrorRecord> = large_errors
            .iter()
            .copied()
            .filter(|e| e.confidence > self.policy.high_confidence_error)
            .collect();
        if !confident.is_empty() {
            patterns.push(ErrorPattern::HighConfidenceErrors {
                count: confident.len(),
                avg_error: mean_of(&confident, |e| e.error),
                avg_confidence: mean_of(&confident, |e| e.confidence),
            });
        }

        let majority = large_errors.len() as f64 * self.policy.pattern_majority;

        let over: Vec<&ErrorRecord> = large_errors
            .iter()
            .copied()
            .filter(|e| e.ai_score > e.expert_score)
            .collect();
        if over.len() as f64 > majority {
            patterns.push(ErrorPattern::SystematicOverestimation {
                count: over.len(),
                avg_overestimation: mean_of(&over, ErrorRecord::signed_error),
            });
        }

        let under: Vec<&ErrorRecord> = large_errors
            .iter()
            .copied()
            .filter(|e| e.ai_score < e.expert_score)
            .collect();
        if under.len() as f64 > majority {
            patterns.push(ErrorPattern::SystematicUnderestimation {
                count: under.len(),
                avg_underestimation: mean_of(&under, |e| -e.signed_error()),
            });
        }

        patterns
    }
}

fn mean_of(errors: &[&ErrorRecord], value: impl Fn(&ErrorRecord) -> f64) -> f64 {
    let values: Vec<f64> = errors.iter().map(|&e| value(e)).collect();
    stats::mean(&values)
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
    use serde_json::json;

    fn batch(pairs: &[(f64, f64, f64)]) -> Vec<VerificationRecord> {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(ai, expert, confidence))| {
                VerificationRecord::new(
                    format!("v{i}"),
                    start + Duration::hours(i64::try_from(i).unwrap()),
                    ai,
                    Some(expert),
                    confidence,
                )
            })
            .collect()
    }

    fn analyze(pairs: &[(f64, f64, f64)]) -> ErrorAnalysis {
        ErrorAnalyzer::default()
            .analyze(&batch(pairs))
            .into_computed()
            .unwrap()
    }

    #[test]
    fn test_no_feedback_is_no_data() {
        let records = vec![VerificationRecord::new(
            "x",
            Utc::now(),
            50.0,
            None,
            0.5,
        )];
        assert_eq!(
            ErrorAnalyzer::default().analyze(&records),
            Section::no_data(NO_ERRORS_MESSAGE)
        );
    }

    #[test]
    fn test_summary_statistics() {
        let analysis = analyze(&[(50.0, 48.0, 0.5), (50.0, 46.0, 0.5), (50.0, 56.0, 0.5)]);
        assert_eq!(analysis.total_errors, 3);
        assert!((analysis.mean_absolute_error - 4.0).abs() < 1e-12);
        assert_eq!(analysis.median_absolute_error, 4.0);
        assert_eq!(analysis.max_error, 6.0);
        assert!((analysis.std_error - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_outlier_detected() {
        // Absolute errors 1, 2, 3, 4, 5, 100.
        let analysis = analyze(&[
            (51.0, 50.0, 0.5),
            (52.0, 50.0, 0.5),
            (53.0, 50.0, 0.5),
            (54.0, 50.0, 0.5),
            (55.0, 50.0, 0.5),
            (100.0, 0.0, 0.5),
        ]);
        assert_eq!(analysis.outliers.count, 1);
        assert!((analysis.outliers.threshold - 8.5).abs() < 1e-12);
        assert_eq!(analysis.outliers.examples[0].verification_id, "v5");
        assert_eq!(analysis.outliers.examples[0].error, 100.0);
        assert_eq!(analysis.error_distribution.iqr(), 2.5);
    }

    #[test]
    fn test_uniform_errors_have_no_outliers() {
        let analysis = analyze(&[(55.0, 50.0, 0.5); 4]);
        assert_eq!(analysis.outliers.count, 0);
        assert!(analysis.outliers.examples.is_empty());
        assert_eq!(analysis.outliers.threshold, 5.0);
    }

    #[test]
    fn test_outlier_examples_are_capped() {
        let mut pairs = vec![(50.0, 50.0, 0.5); 20];
        pairs.extend([(100.0, 0.0, 0.5); 5]);
        let analysis = analyze(&pairs);
        assert_eq!(analysis.outliers.count, 5);
        assert_eq!(analysis.outliers.examples.len(), MAX_OUTLIER_EXAMPLES);
        let ids: Vec<&str> = analysis
            .outliers
            .examples
            .iter()
            .map(|e| e.verification_id.as_str())
            .collect();
        assert_eq!(ids, vec!["v20", "v21", "v22"]);
    }

    #[test]
    fn test_no_large_errors_reports_zero_percentage() {
        let analysis = analyze(&[(85.0, 80.0, 0.95), (70.0, 75.0, 0.95)]);
        assert_eq!(analysis.large_errors.count, 0);
        assert_eq!(analysis.large_errors.percentage, 0.0);
        assert!(analysis.large_errors.common_patterns.is_empty());
    }

    #[test]
    fn test_large_error_threshold_is_strict() {
        let analysis = analyze(&[(70.0, 50.0, 0.5), (71.0, 50.0, 0.5)]);
        assert_eq!(analysis.large_errors.count, 1);
        assert_eq!(analysis.large_errors.percentage, 50.0);
    }

    #[test]
    fn test_overestimation_with_confident_errors() {
        let analysis = analyze(&[
            (95.0, 40.0, 0.95),
            (90.0, 50.0, 0.9),
            (85.0, 30.0, 0.5),
            (20.0, 60.0, 0.5),
            (50.0, 50.0, 0.5),
        ]);
        assert_eq!(analysis.large_errors.count, 4);
        assert_eq!(analysis.large_errors.percentage, 80.0);
        assert!(analysis.has_high_confidence_errors());

        let confident = analysis.pattern("high_confidence_errors").unwrap();
        assert_eq!(confident.count(), 2);
        match confident {
            ErrorPattern::HighConfidenceErrors {
                avg_error,
                avg_confidence,
                ..
            } => {
                assert!((avg_error - 47.5).abs() < 1e-12);
                assert!((avg_confidence - 0.925).abs() < 1e-12);
            }
            other => panic!("unexpected pattern {other:?}"),
        }

        // 3 of 4 large errors overestimate: 75% > 60%.
        let over = analysis.pattern("systematic_overestimation").unwrap();
        assert_eq!(over.count(), 3);
        assert!(analysis.pattern("systematic_underestimation").is_none());
    }

    #[test]
    fn test_balanced_errors_have_no_bias_pattern() {
        let analysis = analyze(&[(90.0, 40.0, 0.5), (40.0, 90.0, 0.5)]);
        assert!(analysis.large_errors.common_patterns.is_empty());
    }

    #[test]
    fn test_underestimation_average() {
        let analysis = analyze(&[(10.0, 60.0, 0.5), (20.0, 50.0, 0.5)]);
        match analysis.pattern("systematic_underestimation").unwrap() {
            ErrorPattern::SystematicUnderestimation {
                count,
                avg_underestimation,
            } => {
                assert_eq!(*count, 2);
                assert_eq!(*avg_underestimation, 40.0);
            }
            other => panic!("unexpected pattern {other:?}"),
        }
    }

    #[test]
    fn test_feedback_is_carried_into_error_records() {
        let record = VerificationRecord::new("fb", Utc::now(), 90.0, Some(10.0), 0.5)
            .with_feedback(json!({"comment": "missed a clause"}));
        let errors = ErrorAnalyzer::default().error_records(&[record]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].feedback, Some(json!({"comment": "missed a clause"})));
        assert_eq!(errors[0].signed_error(), 80.0);
    }
}
