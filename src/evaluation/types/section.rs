//! Per-section result marker.

use serde::{Deserialize, Serialize};

/// A report section that is either computed or explicitly marked as lacking data.
///
/// Used instead of an error so the overall evaluation stays structurally
/// complete when no expert feedback is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section<T> {
    /// The section was computed.
    Computed(T),
    /// Nothing to compute from.
    NoData {
        /// Why the section is empty.
        error: String,
    },
}

impl<T> Section<T> {
    /// Create a no-data marker.
    #[must_use]
    pub fn no_data(error: impl Into<String>) -> Self {
        Self::NoData {
            error: error.into(),
        }
    }

    /// Borrow the computed value.
    #[must_use]
    pub const fn as_computed(&self) -> Option<&T> {
        match self {
            Self::Computed(value) => Some(value),
            Self::NoData { .. } => None,
        }
    }

    /// Take the computed value.
    #[must_use]
    pub fn into_computed(self) -> Option<T> {
        match self {
            Self::Computed(value) => Some(value),
            Self::NoData { .. } => None,
        }
    }

    /// Whether this is a no-data marker.
    #[must_use]
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}
