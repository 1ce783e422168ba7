//! Evaluation and drift detection engine.
//!
//! A batch of [`VerificationRecord`]s for one model flows forward through
//! five pure stages:
//!
//! 1. [`MetricsCalculator`]: pass/fail classification metrics and calibration
//! 2. [`DriftDetector`]: early half vs recent half of the batch
//! 3. [`ErrorAnalyzer`]: residual statistics, outliers, error patterns
//! 4. [`RecommendationEngine`]: ordered threshold rules
//! 5. [`ActionPlanBuilder`]: dated, effort-estimated plan and summary
//!
//! [`Evaluator`] wires the stages together.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use model_evaluator::evaluation::{Category, Evaluator, VerificationRecord};
//!
//! let now = Utc::now();
//! let records = vec![
//!     VerificationRecord::new("a", now, 92.0, Some(90.0), 0.9),
//!     VerificationRecord::new("b", now, 35.0, Some(30.0), 0.9),
//! ];
//!
//! let result = Evaluator::default().evaluate(&records).unwrap();
//! assert_eq!(result.recommendations[0].category, Category::Maintenance);
//! ```

mod drift;
mod error_analyzer;
mod evaluator;
mod metrics;
mod planner;
mod recommender;
pub mod stats;
mod types;

pub use drift::{split_chronologically, DriftDetector};
pub use error_analyzer::{ErrorAnalyzer, MAX_OUTLIER_EXAMPLES, NO_ERRORS_MESSAGE};
pub use evaluator::Evaluator;
pub use metrics::{MetricsCalculator, NO_FEEDBACK_MESSAGE};
pub use planner::{
    due_in_days, priority_multiplier, summarize, ActionPlanBuilder, EffortTable,
    DEFAULT_BASE_HOURS, NEXT_REVIEW_DAYS,
};
pub use recommender::{
    maintenance_recommendation, RecommendationEngine, Rule, RuleContext, DEFAULT_RULES,
};
pub use types::*;
