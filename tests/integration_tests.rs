//! End-to-end tests for the evaluation engine.
//!
//! These tests go through a real SQLite database and verify:
//! - Report assembly for stored models
//! - Degradation to no-data sections without feedback
//! - Drift detection and the resulting action plan
//! - Batch-level properties of the pipeline

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use model_evaluator::config::EvaluationPolicy;
use model_evaluator::error::{AppError, EvaluationError};
use model_evaluator::evaluation::{
    split_chronologically, Category, DriftDetector, ErrorAnalyzer, Evaluator, MetricsCalculator,
    MissingScorePolicy, ModelInfo, Priority, Score, TrackedMetric, VerificationRecord,
};
use model_evaluator::storage::SqliteStorage;
use model_evaluator::traits::FixedTimeProvider;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

const CATEGORY: &str = "contract";
const MODEL_ID: &str = "clause-checker";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
}

fn evaluator(policy: EvaluationPolicy) -> Evaluator<FixedTimeProvider> {
    Evaluator::with_clock(policy, FixedTimeProvider(now()))
}

/// Create a test database in a temporary directory.
async fn create_test_storage() -> (SqliteStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("evaluations.db");
    let storage = SqliteStorage::new(&db_path)
        .await
        .expect("Failed to create storage");
    storage
        .save_model(&ModelInfo::new(MODEL_ID, "Clause Checker", CATEGORY))
        .await
        .unwrap();
    (storage, temp_dir)
}

async fn store_all(storage: &SqliteStorage, records: &[VerificationRecord]) {
    for record in records {
        storage.save_record(CATEGORY, record).await.unwrap();
    }
}

/// 100 records ten days back: each half has 40 labeled and 10 unlabeled
/// records, with `early_correct` / `recent_correct` agreeing labeled pairs.
fn degrading_batch(early_correct: usize, recent_correct: usize) -> Vec<VerificationRecord> {
    let start = now() - Duration::days(10);
    (0..100)
        .map(|i: usize| {
            let (offset, correct) = if i < 50 {
                (i, early_correct)
            } else {
                (i - 50, recent_correct)
            };
            let id = format!("ver-{i:03}");
            let created_at = start + Duration::minutes(i64::try_from(i).unwrap());
            if offset >= 40 {
                return VerificationRecord::new(id, created_at, 75.0, None, 0.85);
            }
            let ai = if offset < correct { 90.0 } else { 30.0 };
            VerificationRecord::new(id, created_at, ai, Some(90.0), 0.85)
        })
        .collect()
}

#[tokio::test]
#[serial]
async fn test_report_for_stored_model() {
    let (storage, _temp_dir) = create_test_storage().await;
    let records: Vec<_> = (0..8)
        .map(|i| {
            let score = if i % 2 == 0 { 92.0 } else { 40.0 };
            VerificationRecord::new(
                format!("v{i}"),
                now() - Duration::hours(30 - i),
                score,
                Some(score - 3.0),
                0.9,
            )
        })
        .collect();
    store_all(&storage, &records).await;

    let report = evaluator(EvaluationPolicy::default())
        .evaluate_model(&storage, MODEL_ID, 7)
        .await
        .unwrap();

    assert_eq!(report.report_metadata.model_id, MODEL_ID);
    assert_eq!(report.report_metadata.generated_at, now());
    assert_eq!(report.model_info.verification_category, CATEGORY);
    assert_eq!(report.evaluation_period.total_predictions, 8);
    assert_eq!(report.evaluation_period.with_feedback, 8);

    let metrics = report.evaluation.performance_metrics.as_computed().unwrap();
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.sample_size, 8);
    assert!(!report.evaluation.drift_analysis.drift_detected);
}

#[tokio::test]
#[serial]
async fn test_lookback_excludes_old_records() {
    let (storage, _temp_dir) = create_test_storage().await;
    store_all(
        &storage,
        &[
            VerificationRecord::new("old", now() - Duration::days(45), 10.0, Some(95.0), 0.9),
            VerificationRecord::new("new", now() - Duration::days(2), 90.0, Some(92.0), 0.9),
        ],
    )
    .await;

    let report = evaluator(EvaluationPolicy::default())
        .evaluate_model(&storage, MODEL_ID, 30)
        .await
        .unwrap();

    assert_eq!(report.evaluation_period.total_predictions, 1);
    let errors = report.evaluation.error_analysis.as_computed().unwrap();
    assert_eq!(errors.max_error, 2.0);
}

#[tokio::test]
#[serial]
async fn test_unknown_model_is_not_found() {
    let (storage, _temp_dir) = create_test_storage().await;

    let err = evaluator(EvaluationPolicy::default())
        .evaluate_model(&storage, "missing-model", 30)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Evaluation(EvaluationError::ModelNotFound { ref model_id })
            if model_id == "missing-model"
    ));
}

#[tokio::test]
#[serial]
async fn test_no_feedback_degrades_to_no_data() {
    let (storage, _temp_dir) = create_test_storage().await;
    let records: Vec<_> = (0..5)
        .map(|i| {
            VerificationRecord::new(format!("u{i}"), now() - Duration::hours(i), 88.0, None, 0.7)
        })
        .collect();
    store_all(&storage, &records).await;

    let report = evaluator(EvaluationPolicy::default())
        .evaluate_model(&storage, MODEL_ID, 30)
        .await
        .unwrap();
    let evaluation = &report.evaluation;

    assert_eq!(report.evaluation_period.total_predictions, 5);
    assert_eq!(report.evaluation_period.with_feedback, 0);
    assert!(evaluation.performance_metrics.is_no_data());
    assert!(evaluation.error_analysis.is_no_data());
    assert!(!evaluation.drift_analysis.drift_detected);
    assert!(evaluation.drift_analysis.significant_changes.is_empty());

    assert_eq!(evaluation.recommendations.len(), 1);
    assert_eq!(evaluation.recommendations[0].category, Category::Maintenance);
    assert_eq!(evaluation.recommendations[0].priority, Priority::Low);
    assert_eq!(evaluation.action_plan.long_term_actions.len(), 1);
    assert!(evaluation.action_plan.immediate_actions.is_empty());
}

#[tokio::test]
#[serial]
async fn test_degrading_model_triggers_drift_plan() {
    let (storage, _temp_dir) = create_test_storage().await;
    // Early: 38/40 correct (0.95). Recent: 34/40 correct (0.85).
    store_all(&storage, &degrading_batch(38, 34)).await;

    let report = evaluator(EvaluationPolicy::default())
        .evaluate_model(&storage, MODEL_ID, 30)
        .await
        .unwrap();
    let evaluation = &report.evaluation;

    assert_eq!(report.evaluation_period.total_predictions, 100);
    assert_eq!(report.evaluation_period.with_feedback, 80);

    let drift = &evaluation.drift_analysis;
    assert!(drift.drift_detected);
    assert_eq!(drift.early_period.count, 50);
    assert_eq!(drift.recent_period.count, 50);
    assert!((drift.drift_magnitude - 0.10).abs() < 1e-9);

    let accuracy = drift.change_for(TrackedMetric::Accuracy).unwrap();
    assert!((accuracy.early_value - 0.95).abs() < 1e-12);
    assert!((accuracy.recent_value - 0.85).abs() < 1e-12);
    assert!(accuracy.change < 0.0);
    assert!(drift.change_for(TrackedMetric::Confidence).is_none());

    let entry = evaluation
        .action_plan
        .immediate_actions
        .iter()
        .find(|e| e.category == Category::Drift)
        .expect("drift entry scheduled");
    assert_eq!(entry.priority, Priority::High);
    assert_eq!(entry.due_date, now() + Duration::days(7));
    assert_eq!(entry.estimated_effort_hours, 36);

    assert!(evaluation.executive_summary.drift_detected);
    assert_eq!(
        evaluation.executive_summary.next_review_date,
        now() + Duration::days(30)
    );
}

#[tokio::test]
#[serial]
async fn test_stable_model_has_no_drift() {
    let (storage, _temp_dir) = create_test_storage().await;
    // 0.95 vs 0.925 stays inside the threshold.
    store_all(&storage, &degrading_batch(38, 37)).await;

    let report = evaluator(EvaluationPolicy::default())
        .evaluate_model(&storage, MODEL_ID, 30)
        .await
        .unwrap();

    assert!(!report.evaluation.drift_analysis.drift_detected);
    assert!(report
        .evaluation
        .recommendations
        .iter()
        .all(|r| r.category != Category::Drift));
}

#[tokio::test]
#[serial]
async fn test_missing_ai_score_policies() {
    let (storage, _temp_dir) = create_test_storage().await;
    let mut records: Vec<_> = (0..3)
        .map(|i| {
            VerificationRecord::new(format!("s{i}"), now() - Duration::hours(i), 90.0, Some(90.0), 0.9)
        })
        .collect();
    records.push(VerificationRecord::new(
        "unscored",
        now() - Duration::hours(5),
        Score::Absent,
        Some(90.0),
        0.9,
    ));
    store_all(&storage, &records).await;

    let as_zero = evaluator(EvaluationPolicy::default())
        .evaluate_model(&storage, MODEL_ID, 30)
        .await
        .unwrap();
    let metrics = as_zero.evaluation.performance_metrics.as_computed().unwrap();
    assert_eq!(metrics.sample_size, 4);
    assert_eq!(metrics.accuracy, 0.75);

    let policy = EvaluationPolicy {
        missing_ai_score: MissingScorePolicy::Exclude,
        ..EvaluationPolicy::default()
    };
    let excluded = evaluator(policy)
        .evaluate_model(&storage, MODEL_ID, 30)
        .await
        .unwrap();
    let metrics = excluded.evaluation.performance_metrics.as_computed().unwrap();
    assert_eq!(metrics.sample_size, 3);
    assert_eq!(metrics.accuracy, 1.0);
}

#[test]
fn test_outliers_capped_and_flagged() {
    let mut records: Vec<_> = (0..20)
        .map(|i| {
            VerificationRecord::new(format!("n{i:02}"), now() - Duration::hours(40 - i), 82.0, Some(80.0), 0.5)
        })
        .collect();
    for i in 0..5 {
        records.push(VerificationRecord::new(
            format!("x{i}"),
            now() - Duration::hours(10 - i),
            95.0,
            Some(15.0),
            0.95,
        ));
    }

    let result = evaluator(EvaluationPolicy::default())
        .evaluate(&records)
        .unwrap();
    let errors = result.error_analysis.as_computed().unwrap();

    assert_eq!(errors.outliers.count, 5);
    assert_eq!(errors.outliers.examples.len(), 3);
    assert_eq!(errors.outliers.examples[0].verification_id, "x0");
    assert_eq!(errors.large_errors.count, 5);
    assert!(errors.has_high_confidence_errors());
    assert!(errors.pattern("systematic_overestimation").is_some());
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.category == Category::ErrorReduction));
}

#[tokio::test]
#[serial]
async fn test_report_json_shape() {
    let (storage, _temp_dir) = create_test_storage().await;
    store_all(
        &storage,
        &[VerificationRecord::new("only", now() - Duration::hours(1), 70.0, None, 0.6)],
    )
    .await;

    let report = evaluator(EvaluationPolicy::default())
        .evaluate_model(&storage, MODEL_ID, 30)
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["report_metadata"]["report_version"], "1.0");
    assert_eq!(json["report_metadata"]["model_id"], MODEL_ID);
    assert!(json["report_metadata"]["report_id"].is_string());
    assert_eq!(json["evaluation_period"]["total_predictions"], 1);
    assert!(json["evaluation"]["performance_metrics"]["no_data"]["error"].is_string());
    assert!(json["evaluation"]["error_analysis"]["no_data"]["error"].is_string());
    assert_eq!(json["evaluation"]["drift_analysis"]["drift_detected"], false);
    assert!(json["evaluation"]["action_plan"]["long_term_actions"].is_array());
}

// ============================================================================
// Batch properties
// ============================================================================

fn arb_batch() -> impl Strategy<Value = Vec<VerificationRecord>> {
    prop::collection::vec((0u8..=100, prop::option::of(0u8..=100), 0u8..=100), 0..60).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (ai, expert, confidence))| {
                    VerificationRecord::new(
                        format!("p{i:03}"),
                        now() - Duration::minutes(i64::try_from(i).unwrap_or(0)),
                        f64::from(ai),
                        expert.map(f64::from),
                        f64::from(confidence) / 100.0,
                    )
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn prop_split_halves_are_chronological(batch in arb_batch()) {
        let (early, recent) = split_chronologically(&batch);
        prop_assert_eq!(early.len(), batch.len() / 2);
        prop_assert_eq!(early.len() + recent.len(), batch.len());
        if let (Some(last_early), Some(first_recent)) = (early.last(), recent.first()) {
            prop_assert!(last_early.created_at <= first_recent.created_at);
        }
    }

    #[test]
    fn prop_input_order_does_not_matter(batch in arb_batch()) {
        let policy = EvaluationPolicy::default();
        let mut reversed = batch.clone();
        reversed.reverse();

        let drift = DriftDetector::new(policy);
        prop_assert_eq!(
            drift.detect(&batch).drift_detected,
            drift.detect(&reversed).drift_detected
        );

        let metrics = MetricsCalculator::new(policy);
        let forward = metrics.calculate(&batch);
        let backward = metrics.calculate(&reversed);
        prop_assert_eq!(forward.is_no_data(), backward.is_no_data());
        if let (Some(a), Some(b)) = (forward.as_computed(), backward.as_computed()) {
            prop_assert_eq!(a.confusion_matrix, b.confusion_matrix);
            prop_assert_eq!(a.sample_size, b.sample_size);
        }

        let errors = ErrorAnalyzer::new(policy);
        if let (Some(a), Some(b)) = (
            errors.analyze(&batch).into_computed(),
            errors.analyze(&reversed).into_computed(),
        ) {
            prop_assert_eq!(a.error_distribution, b.error_distribution);
            prop_assert_eq!(a.outliers.count, b.outliers.count);
        }
    }

    #[test]
    fn prop_always_recommends_something(batch in arb_batch()) {
        let result = evaluator(EvaluationPolicy::default()).evaluate(&batch).unwrap();
        prop_assert!(!result.recommendations.is_empty());
        prop_assert_eq!(result.action_plan.len(), result.recommendations.len());
        prop_assert_eq!(result.total_records, batch.len());
    }
}
