//! Tests for evaluation types.

use super::*;
use crate::config::EvaluationPolicy;
use crate::error::EvaluationError;
use chrono::{TimeZone, Utc};
use test_case::test_case;

fn ts(minute: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
}

// Score tests
#[test]
fn test_score_resolve_present() {
    let score = Score::Present(72.5);
    assert_eq!(score.resolve(MissingScorePolicy::TreatAsZero), Some(72.5));
    assert_eq!(score.resolve(MissingScorePolicy::Exclude), Some(72.5));
}

#[test]
fn test_score_resolve_absent() {
    assert_eq!(
        Score::Absent.resolve(MissingScorePolicy::TreatAsZero),
        Some(0.0)
    );
    assert_eq!(Score::Absent.resolve(MissingScorePolicy::Exclude), None);
}

#[test]
fn test_score_serializes_as_nullable_number() {
    assert_eq!(serde_json::to_string(&Score::Present(81.0)).unwrap(), "81.0");
    assert_eq!(serde_json::to_string(&Score::Absent).unwrap(), "null");
    let parsed: Score = serde_json::from_str("null").unwrap();
    assert_eq!(parsed, Score::Absent);
}

#[test_case("zero" => Ok(MissingScorePolicy::TreatAsZero))]
#[test_case("treat_as_zero" => Ok(MissingScorePolicy::TreatAsZero))]
#[test_case(" Exclude " => Ok(MissingScorePolicy::Exclude))]
fn test_missing_score_policy_parse(raw: &str) -> Result<MissingScorePolicy, String> {
    raw.parse()
}

#[test]
fn test_missing_score_policy_parse_unknown() {
    assert!("drop".parse::<MissingScorePolicy>().is_err());
}

// VerificationRecord tests
#[test]
fn test_record_scored_pair() {
    let reviewed = VerificationRecord::new("a", ts(0), 85.0, Some(90.0), 0.9);
    assert_eq!(
        reviewed.scored_pair(MissingScorePolicy::TreatAsZero),
        Some((85.0, 90.0))
    );

    let unreviewed = VerificationRecord::new("b", ts(0), 85.0, None, 0.9);
    assert!(!unreviewed.has_feedback());
    assert_eq!(unreviewed.scored_pair(MissingScorePolicy::TreatAsZero), None);

    let unscored = VerificationRecord::new("c", ts(0), Score::Absent, Some(90.0), 0.9);
    assert_eq!(
        unscored.scored_pair(MissingScorePolicy::TreatAsZero),
        Some((0.0, 90.0))
    );
    assert_eq!(unscored.scored_pair(MissingScorePolicy::Exclude), None);
}

#[test]
fn test_record_chronological_order_breaks_ties_by_id() {
    let a = VerificationRecord::new("a", ts(5), 80.0, None, 0.5);
    let b = VerificationRecord::new("b", ts(5), 80.0, None, 0.5);
    let c = VerificationRecord::new("0", ts(6), 80.0, None, 0.5);
    assert!(a.chronological_cmp(&b).is_lt());
    assert!(b.chronological_cmp(&c).is_lt());
    assert!(c.chronological_cmp(&a).is_gt());
}

#[test]
fn test_record_validate_accepts_well_formed() {
    let record = VerificationRecord::new("ok", ts(0), 100.0, Some(0.0), 1.0);
    assert!(record.validate().is_ok());
}

#[test_case(VerificationRecord::new("x", ts(0), 101.0, None, 0.5), "ai_score")]
#[test_case(VerificationRecord::new("x", ts(0), 50.0, Some(-1.0), 0.5), "expert_score")]
#[test_case(VerificationRecord::new("x", ts(0), 50.0, None, 1.2), "confidence_score")]
#[test_case(VerificationRecord::new("x", ts(0), f64::NAN, None, 0.5), "ai_score")]
#[test_case(VerificationRecord::new(" ", ts(0), 50.0, None, 0.5), "id")]
fn test_record_validate_rejects(record: VerificationRecord, expected_field: &str) {
    match record.validate() {
        Err(EvaluationError::SchemaViolation { field, .. }) => assert_eq!(field, expected_field),
        other => panic!("expected schema violation, got {other:?}"),
    }
}

// Section tests
#[test]
fn test_section_accessors() {
    let computed: Section<u32> = Section::Computed(7);
    assert_eq!(computed.as_computed(), Some(&7));
    assert!(!computed.is_no_data());

    let empty: Section<u32> = Section::no_data("nothing");
    assert!(empty.is_no_data());
    assert_eq!(empty.into_computed(), None);
}

#[test]
fn test_section_serialization_marks_no_data() {
    let empty: Section<u32> = Section::no_data("No expert feedback");
    let json = serde_json::to_value(&empty).unwrap();
    assert_eq!(json["no_data"]["error"], "No expert feedback");
}

// ConfusionMatrix tests
#[test]
fn test_confusion_matrix_metrics() {
    let mut cm = ConfusionMatrix::default();
    cm.record(true, true);
    cm.record(true, true);
    cm.record(true, false);
    cm.record(false, true);
    cm.record(false, false);

    assert_eq!(cm.total(), 5);
    assert!((cm.accuracy() - 0.6).abs() < 1e-12);
    assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-12);
    assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-12);
    assert!((cm.f1() - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(cm.to_rows(), [[1, 1], [1, 2]]);
}

#[test]
fn test_confusion_matrix_zero_division() {
    let mut cm = ConfusionMatrix::default();
    assert_eq!(cm.accuracy(), 0.0);

    // Only negatives on both sides
    cm.record(false, false);
    assert_eq!(cm.accuracy(), 1.0);
    assert_eq!(cm.precision(), 0.0);
    assert_eq!(cm.recall(), 0.0);
    assert_eq!(cm.f1(), 0.0);
}

// ConfidenceBucket tests
#[test_case(0.95 => ConfidenceBucket::High)]
#[test_case(0.9 => ConfidenceBucket::High)]
#[test_case(0.89 => ConfidenceBucket::Medium)]
#[test_case(0.7 => ConfidenceBucket::Medium)]
#[test_case(0.69 => ConfidenceBucket::Low)]
#[test_case(0.0 => ConfidenceBucket::Low)]
fn test_confidence_bucket_classify(confidence: f64) -> ConfidenceBucket {
    ConfidenceBucket::classify(confidence, &EvaluationPolicy::default())
}

// Drift tests
#[test]
fn test_metric_change_percent() {
    let change = MetricChange::between(TrackedMetric::Accuracy, 0.8, 0.6);
    assert!((change.change + 0.2).abs() < 1e-12);
    assert!((change.absolute_change - 0.2).abs() < 1e-12);
    assert!((change.percent_change + 25.0).abs() < 1e-9);
}

#[test]
fn test_metric_change_zero_early_value() {
    let change = MetricChange::between(TrackedMetric::ScoreCorrelation, 0.0, 0.4);
    assert_eq!(change.percent_change, 0.0);
    assert!((change.absolute_change - 0.4).abs() < 1e-12);
}

#[test]
fn test_tracked_metric_names() {
    let names: Vec<&str> = TrackedMetric::ALL.iter().map(|m| m.as_str()).collect();
    assert_eq!(names, vec!["accuracy", "confidence", "score_correlation"]);
    assert_eq!(TrackedMetric::ScoreCorrelation.to_string(), "score_correlation");
}

// ErrorPattern tests
#[test]
fn test_error_pattern_tags() {
    let pattern = ErrorPattern::SystematicOverestimation {
        count: 4,
        avg_overestimation: 31.5,
    };
    assert_eq!(pattern.name(), "systematic_overestimation");
    assert_eq!(pattern.count(), 4);

    let json = serde_json::to_value(&pattern).unwrap();
    assert_eq!(json["pattern"], "systematic_overestimation");
    assert_eq!(json["count"], 4);
}

// Recommendation tests
#[test]
fn test_priority_rank_and_order() {
    assert_eq!(Priority::High.rank(), 1);
    assert_eq!(Priority::Medium.rank(), 2);
    assert_eq!(Priority::Low.rank(), 3);
    assert!(Priority::High < Priority::Medium);
    assert!(Priority::Medium < Priority::Low);
}

#[test]
fn test_category_serialization() {
    let json = serde_json::to_string(&Category::ConfidenceCalibration).unwrap();
    assert_eq!(json, "\"confidence_calibration\"");
    assert_eq!(Category::ErrorReduction.to_string(), "error_reduction");
}

// Plan tests
#[test_case(0.95 => OverallStatus::Excellent)]
#[test_case(0.9 => OverallStatus::Excellent)]
#[test_case(0.85 => OverallStatus::Good)]
#[test_case(0.8 => OverallStatus::Good)]
#[test_case(0.75 => OverallStatus::NeedsImprovement)]
#[test_case(0.7 => OverallStatus::NeedsImprovement)]
#[test_case(0.5 => OverallStatus::Critical)]
#[test_case(0.0 => OverallStatus::Critical)]
fn test_overall_status_from_accuracy(accuracy: f64) -> OverallStatus {
    OverallStatus::from_accuracy(accuracy)
}

#[test]
fn test_priority_counts() {
    let mut counts = PriorityCounts::default();
    counts.add(Priority::High);
    counts.add(Priority::Medium);
    counts.add(Priority::Medium);
    assert_eq!(counts.high, 1);
    assert_eq!(counts.medium, 2);
    assert_eq!(counts.low, 0);
    assert_eq!(counts.total(), 3);
}

#[test]
fn test_empty_action_plan() {
    let plan = ActionPlan::default();
    assert!(plan.is_empty());
    assert_eq!(plan.entries().count(), 0);
}
