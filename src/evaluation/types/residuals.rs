//! Error (residual) analysis types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Absolute error of one expert-labeled prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Record the error belongs to.
    pub verification_id: String,
    /// Model score used for the comparison.
    pub ai_score: f64,
    /// Expert score.
    pub expert_score: f64,
    /// `|ai_score - expert_score|`.
    pub error: f64,
    /// Model self-reported confidence.
    pub confidence: f64,
    /// When the prediction was made.
    pub created_at: DateTime<Utc>,
    /// Expert notes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<serde_json::Value>,
}

impl ErrorRecord {
    /// `ai_score - expert_score`: positive means the model overestimated.
    #[must_use]
    pub fn signed_error(&self) -> f64 {
        self.ai_score - self.expert_score
    }
}

/// Percentiles of the absolute error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDistribution {
    /// 25th percentile.
    pub q25: f64,
    /// 50th percentile.
    pub q50: f64,
    /// 75th percentile.
    pub q75: f64,
    /// 90th percentile.
    pub q90: f64,
}

impl ErrorDistribution {
    /// Interquartile range.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q75 - self.q25
    }
}

/// Errors beyond the Tukey fence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    /// Number of outliers.
    pub count: usize,
    /// The fence, `Q75 + k * IQR`.
    pub threshold: f64,
    /// First few outliers in input order.
    pub examples: Vec<ErrorRecord>,
}

/// A recurring shape among the large errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum ErrorPattern {
    /// Large errors the model was confident about.
    HighConfidenceErrors {
        /// Matching errors.
        count: usize,
        /// Mean absolute error among them.
        avg_error: f64,
        /// Mean confidence among them.
        avg_confidence: f64,
    },
    /// Most large errors score too high.
    SystematicOverestimation {
        /// Overestimating errors.
        count: usize,
        /// Mean `ai - expert` among them.
        avg_overestimation: f64,
    },
    /// Most large errors score too low.
    SystematicUnderestimation {
        /// Underestimating errors.
        count: usize,
        /// Mean `expert - ai` among them.
        avg_underestimation: f64,
    },
}

impl ErrorPattern {
    /// Snake-case tag of the pattern.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HighConfidenceErrors { .. } => "high_confidence_errors",
            Self::SystematicOverestimation { .. } => "systematic_overestimation",
            Self::SystematicUnderestimation { .. } => "systematic_underestimation",
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::HighConfidenceErrors { .. } => "Large errors made with high model confidence",
            Self::SystematicOverestimation { .. } => "The model tends to overestimate quality",
            Self::SystematicUnderestimation { .. } => "The model tends to underestimate quality",
        }
    }

    /// Number of errors supporting the pattern.
    #[must_use]
    pub const fn count(&self) -> usize {
        match self {
            Self::HighConfidenceErrors { count, .. }
            | Self::SystematicOverestimation { count, .. }
            | Self::SystematicUnderestimation { count, .. } => *count,
        }
    }
}

/// Errors above the large-error threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeErrorSummary {
    /// Number of large errors.
    pub count: usize,
    /// Share of all errors in percent, 0 when there are none.
    pub percentage: f64,
    /// Patterns detected among the large errors.
    pub common_patterns: Vec<ErrorPattern>,
}

/// Aggregate residual statistics over the expert-labeled records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    /// Number of errors analyzed.
    pub total_errors: usize,
    /// Mean absolute error.
    pub mean_absolute_error: f64,
    /// Median absolute error.
    pub median_absolute_error: f64,
    /// Population standard deviation of the absolute error.
    pub std_error: f64,
    /// Largest absolute error.
    pub max_error: f64,
    /// Outliers beyond the Tukey fence.
    pub outliers: OutlierSummary,
    /// Large errors and their patterns.
    pub large_errors: LargeErrorSummary,
    /// Error percentiles.
    pub error_distribution: ErrorDistribution,
}

impl ErrorAnalysis {
    /// Whether the high-confidence error pattern fired.
    #[must_use]
    pub fn has_high_confidence_errors(&self) -> bool {
        self.large_errors
            .common_patterns
            .iter()
            .any(|p| matches!(p, ErrorPattern::HighConfidenceErrors { .. }))
    }

    /// Find a pattern by tag.
    #[must_use]
    pub fn pattern(&self, name: &str) -> Option<&ErrorPattern> {
        self.large_errors
            .common_patterns
            .iter()
            .find(|p| p.name() == name)
    }
}
