//! Evaluation pipeline entry point.
//!
//! [`Evaluator::evaluate`] runs the five stages over one immutable batch.
//! [`Evaluator::evaluate_model`] loads the batch through a
//! [`VerificationSource`] first and wraps the result in a report.

use std::collections::HashSet;

use chrono::Duration;
use uuid::Uuid;

use super::drift::DriftDetector;
use super::error_analyzer::ErrorAnalyzer;
use super::metrics::MetricsCalculator;
use super::planner::{summarize, ActionPlanBuilder};
use super::recommender::RecommendationEngine;
use super::types::{
    EvaluationPeriod, EvaluationReport, EvaluationResult, ReportMetadata, Section,
    VerificationRecord, REPORT_VERSION,
};
use crate::config::EvaluationPolicy;
use crate::error::{AppError, EvaluationError};
use crate::traits::{RealTimeProvider, TimeProvider, VerificationSource};

/// Stateless evaluation engine.
///
/// Holds only configuration; every call works on its own batch, so one
/// evaluator can be shared across concurrent evaluations.
#[derive(Debug, Clone)]
pub struct Evaluator<T: TimeProvider = RealTimeProvider> {
    policy: EvaluationPolicy,
    metrics: MetricsCalculator,
    drift: DriftDetector,
    errors: ErrorAnalyzer,
    recommender: RecommendationEngine,
    planner: ActionPlanBuilder,
    clock: T,
}

impl Default for Evaluator<RealTimeProvider> {
    fn default() -> Self {
        Self::new(EvaluationPolicy::default())
    }
}

impl Evaluator<RealTimeProvider> {
    /// Create an evaluator using the system clock.
    #[must_use]
    pub fn new(policy: EvaluationPolicy) -> Self {
        Self::with_clock(policy, RealTimeProvider)
    }
}

impl<T: TimeProvider> Evaluator<T> {
    /// Create an evaluator with an injected clock.
    #[must_use]
    pub fn with_clock(policy: EvaluationPolicy, clock: T) -> Self {
        Self {
            policy,
            metrics: MetricsCalculator::new(policy),
            drift: DriftDetector::new(policy),
            errors: ErrorAnalyzer::new(policy),
            recommender: RecommendationEngine::new(policy),
            planner: ActionPlanBuilder::default(),
            clock,
        }
    }

    /// Replace the recommendation engine, e.g. to add rules.
    #[must_use]
    pub fn with_recommender(mut self, recommender: RecommendationEngine) -> Self {
        self.recommender = recommender;
        self
    }

    /// Replace the action plan builder, e.g. to change the effort table.
    #[must_use]
    pub fn with_planner(mut self, planner: ActionPlanBuilder) -> Self {
        self.planner = planner;
        self
    }

    /// The active policy.
    #[must_use]
    pub const fn policy(&self) -> &EvaluationPolicy {
        &self.policy
    }

    /// Evaluate one batch.
    ///
    /// Missing feedback degrades individual sections to
    /// [`Section::NoData`] instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::SchemaViolation`] if a record is malformed
    /// or two records share an id.
    pub fn evaluate(
        &self,
        records: &[VerificationRecord],
    ) -> Result<EvaluationResult, EvaluationError> {
        validate_batch(records)?;

        let performance_metrics = self.metrics.calculate(records);
        let drift_analysis = self.drift.detect(records);
        let error_analysis = self.errors.analyze(records);
        let recommendations =
            self.recommender
                .recommend(&performance_metrics, &drift_analysis, &error_analysis);

        let now = self.clock.now();
        let action_plan = self.planner.build(&recommendations, now);
        let executive_summary =
            summarize(&performance_metrics, &drift_analysis, &recommendations, now);

        let with_feedback = records.iter().filter(|r| r.has_feedback()).count();
        if let Section::NoData { error } = &performance_metrics {
            tracing::warn!(total_records = records.len(), reason = %error, "No metrics computed");
        }

        tracing::info!(
            total_records = records.len(),
            with_feedback,
            status = ?executive_summary.overall_status,
            drift_detected = drift_analysis.drift_detected,
            recommendations = recommendations.len(),
            "Evaluation complete"
        );

        Ok(EvaluationResult {
            total_records: records.len(),
            with_feedback,
            performance_metrics,
            drift_analysis,
            error_analysis,
            recommendations,
            action_plan,
            executive_summary,
        })
    }

    /// Load a model's recent records and evaluate them.
    ///
    /// # Errors
    ///
    /// - [`EvaluationError::InvalidLookback`] for a zero-day window
    /// - [`EvaluationError::ModelNotFound`] if the source has no such model
    /// - [`AppError::Storage`] if loading fails
    /// - [`EvaluationError::SchemaViolation`] if a loaded record is malformed
    pub async fn evaluate_model<S>(
        &self,
        source: &S,
        model_id: &str,
        lookback_days: u32,
    ) -> Result<EvaluationReport, AppError>
    where
        S: VerificationSource + ?Sized,
    {
        if lookback_days == 0 {
            return Err(EvaluationError::InvalidLookback {
                days: lookback_days,
            }
            .into());
        }

        let model = source
            .get_model(model_id)
            .await?
            .ok_or_else(|| EvaluationError::ModelNotFound {
                model_id: model_id.to_string(),
            })?;

        let now = self.clock.now();
        let since = now - Duration::days(i64::from(lookback_days));
        let records = source.get_verifications(&model, since).await?;

        tracing::info!(
            model_id = %model.id,
            category = %model.verification_category,
            records = records.len(),
            lookback_days,
            "Loaded verification records"
        );

        let evaluation = self.evaluate(&records)?;

        Ok(EvaluationReport {
            report_metadata: ReportMetadata {
                report_id: Uuid::new_v4(),
                generated_at: now,
                model_id: model.id.clone(),
                report_version: REPORT_VERSION.to_string(),
            },
            evaluation_period: EvaluationPeriod {
                days: lookback_days,
                total_predictions: evaluation.total_records,
                with_feedback: evaluation.with_feedback,
            },
            model_info: model,
            evaluation,
        })
    }
}

fn validate_batch(records: &[VerificationRecord]) -> Result<(), EvaluationError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        record.validate()?;
        if !seen.insert(record.id.as_str()) {
            return Err(EvaluationError::schema(
                &record.id,
                "id",
                "is not unique within the batch",
            ));
        }
    }
    Ok(())
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
    use crate::error::StorageError;
    use crate::evaluation::types::{Category, ModelInfo, OverallStatus, Priority};
    use crate::test_utils::{
        fixed_time, mock_source_error, mock_source_with, mock_time_provider, split_batch,
    };
    use crate::traits::{FixedTimeProvider, MockTimeProvider, MockVerificationSource};
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn evaluator() -> Evaluator<FixedTimeProvider> {
        Evaluator::with_clock(EvaluationPolicy::default(), FixedTimeProvider(now()))
    }

    fn healthy_batch() -> Vec<VerificationRecord> {
        (0..10)
            .map(|i| {
                let ai = if i % 2 == 0 { 90.0 } else { 30.0 };
                VerificationRecord::new(
                    format!("v{i}"),
                    now() - Duration::hours(20 - i),
                    ai,
                    Some(ai + 2.0),
                    0.75,
                )
            })
            .collect()
    }

    #[test]
    fn test_healthy_batch() {
        let result = evaluator().evaluate(&healthy_batch()).unwrap();
        assert_eq!(result.total_records, 10);
        assert_eq!(result.with_feedback, 10);
        assert!(!result.drift_analysis.drift_detected);
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].category, Category::Maintenance);
        assert_eq!(result.executive_summary.overall_status, OverallStatus::Excellent);
        assert_eq!(result.action_plan.long_term_actions.len(), 1);
        assert_eq!(
            result.action_plan.long_term_actions[0].due_date,
            now() + Duration::days(90)
        );
    }

    #[test]
    fn test_empty_feedback_batch() {
        let records: Vec<_> = (0..6)
            .map(|i| VerificationRecord::new(format!("u{i}"), now(), 85.0, None, 0.9))
            .collect();
        let result = evaluator().evaluate(&records).unwrap();

        assert_eq!(result.total_records, 6);
        assert_eq!(result.with_feedback, 0);
        assert!(result.performance_metrics.is_no_data());
        assert!(result.error_analysis.is_no_data());
        assert!(!result.drift_analysis.drift_detected);
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].category, Category::Maintenance);
        assert_eq!(result.recommendations[0].priority, Priority::Low);
        assert_eq!(result.executive_summary.overall_status, OverallStatus::Critical);
    }

    #[test]
    fn test_empty_batch() {
        let result = evaluator().evaluate(&[]).unwrap();
        assert_eq!(result.total_records, 0);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut records = healthy_batch();
        records[3].id = "v0".to_string();
        let err = evaluator().evaluate(&records).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::SchemaViolation { ref record_id, ref field, .. }
                if record_id == "v0" && field == "id"
        ));
    }

    #[test]
    fn test_rejects_malformed_record() {
        let mut records = healthy_batch();
        records[1].confidence_score = 3.0;
        assert!(matches!(
            evaluator().evaluate(&records),
            Err(EvaluationError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let records = healthy_batch();
        let engine = evaluator();
        assert_eq!(
            engine.evaluate(&records).unwrap(),
            engine.evaluate(&records).unwrap()
        );
    }

    #[test]
    fn test_clock_drives_plan_dates() {
        let mut clock = MockTimeProvider::new();
        clock.expect_now().times(1).returning(now);
        let engine = Evaluator::with_clock(EvaluationPolicy::default(), clock);

        let result = engine.evaluate(&healthy_batch()).unwrap();
        assert_eq!(
            result.executive_summary.next_review_date,
            now() + Duration::days(30)
        );
    }

    #[tokio::test]
    async fn test_evaluate_model_report() {
        let mut source = MockVerificationSource::new();
        source
            .expect_get_model()
            .returning(|id| Ok(Some(ModelInfo::new(id, "Clause Checker", "contract"))));
        source
            .expect_get_verifications()
            .withf(|model, since| {
                model.verification_category == "contract" && *since == now() - Duration::days(30)
            })
            .returning(|_, _| Ok(healthy_batch()));

        let report = evaluator()
            .evaluate_model(&source, "model-a", 30)
            .await
            .unwrap();

        assert_eq!(report.report_metadata.model_id, "model-a");
        assert_eq!(report.report_metadata.report_version, "1.0");
        assert_eq!(report.report_metadata.generated_at, now());
        assert_eq!(report.model_info.name, "Clause Checker");
        assert_eq!(report.evaluation_period.days, 30);
        assert_eq!(report.evaluation_period.total_predictions, 10);
        assert_eq!(report.evaluation_period.with_feedback, 10);
    }

    #[tokio::test]
    async fn test_evaluate_model_not_found() {
        let source = mock_source_with(ModelInfo::new("model-a", "A", "contract"), Vec::new());

        let err = evaluator()
            .evaluate_model(&source, "ghost", 30)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Evaluation(EvaluationError::ModelNotFound { ref model_id }) if model_id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_evaluate_model_zero_lookback() {
        let mut source = MockVerificationSource::new();
        source.expect_get_model().never();

        let err = evaluator()
            .evaluate_model(&source, "model-a", 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Evaluation(EvaluationError::InvalidLookback { days: 0 })
        ));
    }

    #[tokio::test]
    async fn test_evaluate_model_storage_error() {
        let source = mock_source_error(StorageError::ConnectionFailed {
            message: "database is locked".to_string(),
        });

        let err = evaluator()
            .evaluate_model(&source, "model-a", 30)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn test_drift_scenario_schedules_immediate_action() {
        // 19/20 early vs 17/20 recent: accuracy 0.95 -> 0.85.
        let engine = Evaluator::with_clock(EvaluationPolicy::default(), mock_time_provider(fixed_time()));
        let result = engine.evaluate(&split_batch(40, 19, 17)).unwrap();

        let drift = &result.drift_analysis;
        assert!(drift.drift_detected);
        assert!((drift.drift_magnitude - 0.10).abs() < 1e-9);

        let entry = result
            .action_plan
            .immediate_actions
            .iter()
            .find(|e| e.category == Category::Drift)
            .unwrap();
        assert_eq!(entry.priority, Priority::High);
        assert_eq!(entry.due_date, fixed_time() + Duration::days(7));
        assert_eq!(entry.estimated_effort_hours, 36);
    }
}
