//! Evaluation types.
//!
//! # Module Organization
//!
//! - `record`: Input records, the `Score` sum type, model metadata
//! - `section`: Computed-or-no-data marker for report sections
//! - `metrics`: Metrics snapshot, confusion matrix, confidence buckets
//! - `drift`: Two-period drift comparison
//! - `residuals`: Error records, error analysis, error patterns
//! - `recommendation`: Priorities, categories, recommendations
//! - `plan`: Action plan and executive summary
//! - `report`: Evaluation result and full report

mod drift;
mod metrics;
mod plan;
mod recommendation;
mod record;
mod report;
mod residuals;
mod section;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::float_cmp
)]
mod tests;

pub use drift::{DriftReport, MetricChange, PeriodSummary, TrackedMetric};
pub use metrics::{
    BucketStats, ConfidenceBreakdown, ConfidenceBucket, ConfusionMatrix, MetricsSnapshot,
};
pub use plan::{
    ActionPlan, ActionPlanEntry, ExecutiveSummary, KeyMetrics, OverallStatus, PriorityCounts,
};
pub use recommendation::{Category, Priority, Recommendation};
pub use record::{MissingScorePolicy, ModelInfo, Score, VerificationRecord};
pub use report::{
    EvaluationPeriod, EvaluationReport, EvaluationResult, ReportMetadata, REPORT_VERSION,
};
pub use residuals::{
    ErrorAnalysis, ErrorDistribution, ErrorPattern, ErrorRecord, LargeErrorSummary,
    OutlierSummary,
};
pub use section::Section;
