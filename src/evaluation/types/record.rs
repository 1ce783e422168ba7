//! Input record types.
//!
//! A [`VerificationRecord`] is one automated prediction, optionally paired
//! with an expert-assigned ground-truth score.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

// ============================================================================
// Score
// ============================================================================

/// A model score that may be missing from the prediction result.
///
/// Serializes as a plain nullable number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Score {
    /// The prediction carried a score.
    Present(f64),
    /// The prediction result had no score.
    #[default]
    Absent,
}

impl Score {
    /// The raw value, if present.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent => None,
        }
    }

    /// Whether a value is present.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Apply a missing-score policy.
    ///
    /// Returns `None` when the record must be left out of score-based metrics.
    #[must_use]
    pub const fn resolve(self, policy: MissingScorePolicy) -> Option<f64> {
        match (self, policy) {
            (Self::Present(v), _) => Some(v),
            (Self::Absent, MissingScorePolicy::TreatAsZero) => Some(0.0),
            (Self::Absent, MissingScorePolicy::Exclude) => None,
        }
    }
}

impl From<Option<f64>> for Score {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl From<Score> for Option<f64> {
    fn from(score: Score) -> Self {
        score.value()
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self::Present(value)
    }
}

// ============================================================================
// MissingScorePolicy
// ============================================================================

/// How an absent AI score is handled on a record that has expert feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingScorePolicy {
    /// A missing score counts as 0, i.e. an automatic "fail".
    #[default]
    TreatAsZero,
    /// Records without a score are left out of every metric.
    Exclude,
}

impl FromStr for MissingScorePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" | "treat_as_zero" => Ok(Self::TreatAsZero),
            "exclude" => Ok(Self::Exclude),
            other => Err(format!("unknown missing score policy: {other}")),
        }
    }
}

// ============================================================================
// VerificationRecord
// ============================================================================

/// One evaluated prediction instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Opaque unique identifier.
    pub id: String,
    /// When the prediction was made.
    pub created_at: DateTime<Utc>,
    /// Model score on the 0-100 scale.
    pub ai_score: Score,
    /// Expert score on the 0-100 scale, present only for reviewed records.
    pub expert_score: Option<f64>,
    /// Model self-reported confidence (0.0 to 1.0).
    pub confidence_score: f64,
    /// Free-form expert notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_feedback: Option<serde_json::Value>,
}

impl VerificationRecord {
    /// Create a new record without detailed feedback.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        ai_score: impl Into<Score>,
        expert_score: Option<f64>,
        confidence_score: f64,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            ai_score: ai_score.into(),
            expert_score,
            confidence_score,
            detailed_feedback: None,
        }
    }

    /// Attach expert notes.
    #[must_use]
    pub fn with_feedback(mut self, feedback: serde_json::Value) -> Self {
        self.detailed_feedback = Some(feedback);
        self
    }

    /// Whether an expert reviewed this record.
    #[must_use]
    pub const fn has_feedback(&self) -> bool {
        self.expert_score.is_some()
    }

    /// The `(ai, expert)` score pair used by every metric, if the record is eligible.
    #[must_use]
    pub fn scored_pair(&self, policy: MissingScorePolicy) -> Option<(f64, f64)> {
        let expert = self.expert_score?;
        let ai = self.ai_score.resolve(policy)?;
        Some((ai, expert))
    }

    /// Total order by `created_at`, ties broken by `id`.
    #[must_use]
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Check that the record has the shape the engine expects.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::SchemaViolation`] for an empty id, scores
    /// outside `[0, 100]`, confidence outside `[0, 1]` or non-finite numbers.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        if self.id.trim().is_empty() {
            return Err(EvaluationError::schema("<empty>", "id", "must not be empty"));
        }
        if let Score::Present(ai) = self.ai_score {
            check_score(&self.id, "ai_score", ai)?;
        }
        if let Some(expert) = self.expert_score {
            check_score(&self.id, "expert_score", expert)?;
        }
        if !self.confidence_score.is_finite() || !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(EvaluationError::schema(
                &self.id,
                "confidence_score",
                format!("must be within [0, 1], got {}", self.confidence_score),
            ));
        }
        Ok(())
    }
}

fn check_score(id: &str, field: &str, value: f64) -> Result<(), EvaluationError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(EvaluationError::schema(
            id,
            field,
            format!("must be within [0, 100], got {value}"),
        ))
    }
}

// ============================================================================
// ModelInfo
// ============================================================================

/// A deployed model as known to the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Verification category whose records this model produces.
    pub verification_category: String,
}

impl ModelInfo {
    /// Create model metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        verification_category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            verification_category: verification_category.into(),
        }
    }
}
