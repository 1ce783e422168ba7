//! Recommendation types.

use serde::{Deserialize, Serialize};

/// Urgency of a recommendation.
///
/// Declaration order is rank order: `High < Medium < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Act within a week.
    High,
    /// Act within a month.
    Medium,
    /// Act within a quarter.
    Low,
}

impl Priority {
    /// Sort rank, 1 for high through 3 for low.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Area a recommendation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Accuracy below the floor.
    Performance,
    /// Weak score agreement with experts.
    Calibration,
    /// Metrics moved between periods.
    Drift,
    /// Too many large errors.
    ErrorReduction,
    /// Confident but wrong predictions.
    ConfidenceCalibration,
    /// Nothing wrong; keep monitoring.
    Maintenance,
}

impl Category {
    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Calibration => "calibration",
            Self::Drift => "drift",
            Self::ErrorReduction => "error_reduction",
            Self::ConfidenceCalibration => "confidence_calibration",
            Self::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that should be investigated, and how urgently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Urgency.
    pub priority: Priority,
    /// Area addressed.
    pub category: Category,
    /// Short title.
    pub title: String,
    /// What was observed.
    pub description: String,
    /// Ordered remediation steps.
    pub actions: Vec<String>,
}

impl Recommendation {
    /// Create a recommendation.
    #[must_use]
    pub fn new(
        priority: Priority,
        category: Category,
        title: impl Into<String>,
        description: impl Into<String>,
        actions: &[&str],
    ) -> Self {
        Self {
            priority,
            category,
            title: title.into(),
            description: description.into(),
            actions: actions.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}
