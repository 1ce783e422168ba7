//! Evaluation output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::drift::DriftReport;
use super::metrics::MetricsSnapshot;
use super::plan::{ActionPlan, ExecutiveSummary};
use super::recommendation::Recommendation;
use super::record::ModelInfo;
use super::residuals::ErrorAnalysis;
use super::section::Section;

/// Version stamped on every report.
pub const REPORT_VERSION: &str = "1.0";

/// Everything the engine derives from one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Records in the batch.
    pub total_records: usize,
    /// Records with expert feedback.
    pub with_feedback: usize,
    /// Classification metrics.
    pub performance_metrics: Section<MetricsSnapshot>,
    /// Early vs recent comparison.
    pub drift_analysis: DriftReport,
    /// Residual statistics.
    pub error_analysis: Section<ErrorAnalysis>,
    /// Recommendations in rule order.
    pub recommendations: Vec<Recommendation>,
    /// Dated, prioritized plan.
    pub action_plan: ActionPlan,
    /// Headline summary.
    pub executive_summary: ExecutiveSummary,
}

/// Window a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationPeriod {
    /// Lookback in days.
    pub days: u32,
    /// Predictions in the window.
    pub total_predictions: usize,
    /// Predictions with expert feedback.
    pub with_feedback: usize,
}

/// Provenance of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Unique identifier of this report.
    pub report_id: Uuid,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Model evaluated.
    pub model_id: String,
    /// Report format version.
    pub report_version: String,
}

/// Full evaluation report for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Provenance.
    pub report_metadata: ReportMetadata,
    /// Model metadata.
    pub model_info: ModelInfo,
    /// Window covered.
    pub evaluation_period: EvaluationPeriod,
    /// Engine output.
    pub evaluation: EvaluationResult,
}
