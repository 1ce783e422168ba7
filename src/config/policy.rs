//! Evaluation policy constants.
//!
//! Every threshold the engine applies lives here so it can be tuned per
//! deployment instead of being hard-coded in the pipeline stages.
//!
//! # Example
//!
//! ```
//! use model_evaluator::config::EvaluationPolicy;
//!
//! let policy = EvaluationPolicy::default();
//! assert!((policy.pass_threshold - 80.0).abs() < f64::EPSILON);
//! assert!(policy.validate().is_ok());
//! ```

use std::env;

use crate::error::ConfigError;
use crate::evaluation::MissingScorePolicy;

/// Default: scores at or above this are binarized as "pass".
pub const DEFAULT_PASS_THRESHOLD: f64 = 80.0;

/// Default: absolute metric change that counts as drift.
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.05;

/// Default: absolute error (in score points) above which an error is "large".
pub const DEFAULT_LARGE_ERROR_THRESHOLD: f64 = 20.0;

/// Default: Tukey fence multiplier.
pub const DEFAULT_OUTLIER_IQR_MULTIPLIER: f64 = 1.5;

/// Default: lower bound of the high confidence bucket.
pub const DEFAULT_CONFIDENCE_HIGH: f64 = 0.9;

/// Default: lower bound of the medium confidence bucket.
pub const DEFAULT_CONFIDENCE_MEDIUM: f64 = 0.7;

/// Default: large-error percentage that raises an error-reduction alert.
pub const DEFAULT_LARGE_ERROR_ALERT_PCT: f64 = 15.0;

/// Default: share of large errors in one direction that marks a systematic bias.
pub const DEFAULT_PATTERN_MAJORITY: f64 = 0.6;

/// Default: confidence above which a large error counts as overconfident.
pub const DEFAULT_HIGH_CONFIDENCE_ERROR: f64 = 0.8;

/// Default: accuracy below which a performance recommendation is raised.
pub const DEFAULT_MIN_ACCURACY: f64 = 0.8;

/// Default: correlation below which a calibration recommendation is raised.
pub const DEFAULT_MIN_CORRELATION: f64 = 0.7;

/// Thresholds applied by every stage of the evaluation pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationPolicy {
    /// Pass/fail score threshold on the 0-100 scale.
    pub pass_threshold: f64,
    /// Minimum absolute change between periods to flag drift.
    pub drift_threshold: f64,
    /// Absolute error in points above which an error is "large".
    pub large_error_threshold: f64,
    /// IQR multiplier for the outlier fence.
    pub outlier_iqr_multiplier: f64,
    /// Confidence at or above which a record is in the high bucket.
    pub confidence_high: f64,
    /// Confidence at or above which a record is in the medium bucket.
    pub confidence_medium: f64,
    /// Large-error percentage (0-100) that triggers an alert.
    pub large_error_alert_pct: f64,
    /// Fraction of large errors (0-1) needed for a systematic bias pattern.
    pub pattern_majority: f64,
    /// Confidence above which a large error is an overconfident error.
    pub high_confidence_error: f64,
    /// Accuracy floor for the performance rule.
    pub min_accuracy: f64,
    /// Correlation floor for the calibration rule.
    pub min_correlation: f64,
    /// How an absent AI score on an expert-labeled record is treated.
    pub missing_ai_score: MissingScorePolicy,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            large_error_threshold: DEFAULT_LARGE_ERROR_THRESHOLD,
            outlier_iqr_multiplier: DEFAULT_OUTLIER_IQR_MULTIPLIER,
            confidence_high: DEFAULT_CONFIDENCE_HIGH,
            confidence_medium: DEFAULT_CONFIDENCE_MEDIUM,
            large_error_alert_pct: DEFAULT_LARGE_ERROR_ALERT_PCT,
            pattern_majority: DEFAULT_PATTERN_MAJORITY,
            high_confidence_error: DEFAULT_HIGH_CONFIDENCE_ERROR,
            min_accuracy: DEFAULT_MIN_ACCURACY,
            min_correlation: DEFAULT_MIN_CORRELATION,
            missing_ai_score: MissingScorePolicy::default(),
        }
    }
}

impl EvaluationPolicy {
    /// Load the policy from environment variables.
    ///
    /// Environment variables (all optional):
    /// - `EVAL_PASS_THRESHOLD` (default: 80)
    /// - `EVAL_DRIFT_THRESHOLD` (default: 0.05)
    /// - `EVAL_LARGE_ERROR_THRESHOLD` (default: 20)
    /// - `EVAL_OUTLIER_IQR_MULTIPLIER` (default: 1.5)
    /// - `EVAL_CONFIDENCE_HIGH` (default: 0.9)
    /// - `EVAL_CONFIDENCE_MEDIUM` (default: 0.7)
    /// - `EVAL_LARGE_ERROR_ALERT_PCT` (default: 15)
    /// - `EVAL_PATTERN_MAJORITY` (default: 0.6)
    /// - `EVAL_HIGH_CONFIDENCE_ERROR` (default: 0.8)
    /// - `EVAL_MIN_ACCURACY` (default: 0.8)
    /// - `EVAL_MIN_CORRELATION` (default: 0.7)
    /// - `EVAL_MISSING_AI_SCORE`: `zero` or `exclude` (default: `zero`)
    ///
    /// Unparsable values are logged and replaced by their default.
    #[must_use]
    pub fn from_env() -> Self {
        let missing_ai_score = env::var("EVAL_MISSING_AI_SCORE").map_or_else(
            |_| MissingScorePolicy::default(),
            |value| {
                value.parse().unwrap_or_else(|_| {
                    tracing::warn!(
                        var = "EVAL_MISSING_AI_SCORE",
                        value = %value,
                        "Invalid environment variable value, using default"
                    );
                    MissingScorePolicy::default()
                })
            },
        );

        Self {
            pass_threshold: env_f64("EVAL_PASS_THRESHOLD", DEFAULT_PASS_THRESHOLD),
            drift_threshold: env_f64("EVAL_DRIFT_THRESHOLD", DEFAULT_DRIFT_THRESHOLD),
            large_error_threshold: env_f64(
                "EVAL_LARGE_ERROR_THRESHOLD",
                DEFAULT_LARGE_ERROR_THRESHOLD,
            ),
            outlier_iqr_multiplier: env_f64(
                "EVAL_OUTLIER_IQR_MULTIPLIER",
                DEFAULT_OUTLIER_IQR_MULTIPLIER,
            ),
            confidence_high: env_f64("EVAL_CONFIDENCE_HIGH", DEFAULT_CONFIDENCE_HIGH),
            confidence_medium: env_f64("EVAL_CONFIDENCE_MEDIUM", DEFAULT_CONFIDENCE_MEDIUM),
            large_error_alert_pct: env_f64(
                "EVAL_LARGE_ERROR_ALERT_PCT",
                DEFAULT_LARGE_ERROR_ALERT_PCT,
            ),
            pattern_majority: env_f64("EVAL_PATTERN_MAJORITY", DEFAULT_PATTERN_MAJORITY),
            high_confidence_error: env_f64(
                "EVAL_HIGH_CONFIDENCE_ERROR",
                DEFAULT_HIGH_CONFIDENCE_ERROR,
            ),
            min_accuracy: env_f64("EVAL_MIN_ACCURACY", DEFAULT_MIN_ACCURACY),
            min_correlation: env_f64("EVAL_MIN_CORRELATION", DEFAULT_MIN_CORRELATION),
            missing_ai_score,
        }
    }

    /// Validate ranges and the ordering of bucket boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("EVAL_PASS_THRESHOLD", self.pass_threshold, 0.0, 100.0)?;
        check_range("EVAL_DRIFT_THRESHOLD", self.drift_threshold, 0.0, 1.0)?;
        check_range(
            "EVAL_LARGE_ERROR_THRESHOLD",
            self.large_error_threshold,
            0.0,
            100.0,
        )?;
        check_range(
            "EVAL_OUTLIER_IQR_MULTIPLIER",
            self.outlier_iqr_multiplier,
            0.0,
            10.0,
        )?;
        check_range("EVAL_CONFIDENCE_HIGH", self.confidence_high, 0.0, 1.0)?;
        check_range("EVAL_CONFIDENCE_MEDIUM", self.confidence_medium, 0.0, 1.0)?;
        check_range(
            "EVAL_LARGE_ERROR_ALERT_PCT",
            self.large_error_alert_pct,
            0.0,
            100.0,
        )?;
        check_range("EVAL_PATTERN_MAJORITY", self.pattern_majority, 0.0, 1.0)?;
        check_range(
            "EVAL_HIGH_CONFIDENCE_ERROR",
            self.high_confidence_error,
            0.0,
            1.0,
        )?;
        check_range("EVAL_MIN_ACCURACY", self.min_accuracy, 0.0, 1.0)?;
        check_range("EVAL_MIN_CORRELATION", self.min_correlation, -1.0, 1.0)?;

        if self.confidence_medium >= self.confidence_high {
            return Err(ConfigError::InvalidValue {
                var: "EVAL_CONFIDENCE_MEDIUM".into(),
                reason: format!(
                    "must be below EVAL_CONFIDENCE_HIGH ({})",
                    self.confidence_high
                ),
            });
        }

        Ok(())
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name).map_or(default, |value| match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => parsed,
        Ok(_) | Err(_) => {
            tracing::warn!(
                var = name,
                value = %value,
                default = default,
                "Invalid environment variable value, using default"
            );
            default
        }
    })
}

fn check_range(var: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            var: var.into(),
            reason: format!("must be between {min} and {max}"),
        })
    }
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
    use serial_test::serial;

    const POLICY_VARS: &[&str] = &[
        "EVAL_PASS_THRESHOLD",
        "EVAL_DRIFT_THRESHOLD",
        "EVAL_LARGE_ERROR_THRESHOLD",
        "EVAL_OUTLIER_IQR_MULTIPLIER",
        "EVAL_CONFIDENCE_HIGH",
        "EVAL_CONFIDENCE_MEDIUM",
        "EVAL_LARGE_ERROR_ALERT_PCT",
        "EVAL_PATTERN_MAJORITY",
        "EVAL_HIGH_CONFIDENCE_ERROR",
        "EVAL_MIN_ACCURACY",
        "EVAL_MIN_CORRELATION",
        "EVAL_MISSING_AI_SCORE",
    ];

    fn clear_policy_env() {
        for var in POLICY_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_policy_values() {
        let policy = EvaluationPolicy::default();
        assert_eq!(policy.pass_threshold, 80.0);
        assert_eq!(policy.drift_threshold, 0.05);
        assert_eq!(policy.large_error_threshold, 20.0);
        assert_eq!(policy.outlier_iqr_multiplier, 1.5);
        assert_eq!(policy.confidence_high, 0.9);
        assert_eq!(policy.confidence_medium, 0.7);
        assert_eq!(policy.large_error_alert_pct, 15.0);
        assert_eq!(policy.pattern_majority, 0.6);
        assert_eq!(policy.missing_ai_score, MissingScorePolicy::TreatAsZero);
        assert!(policy.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_policy_env();
        assert_eq!(EvaluationPolicy::from_env(), EvaluationPolicy::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_policy_env();
        env::set_var("EVAL_PASS_THRESHOLD", "75");
        env::set_var("EVAL_DRIFT_THRESHOLD", "0.1");
        env::set_var("EVAL_MISSING_AI_SCORE", "exclude");

        let policy = EvaluationPolicy::from_env();
        assert_eq!(policy.pass_threshold, 75.0);
        assert_eq!(policy.drift_threshold, 0.1);
        assert_eq!(policy.missing_ai_score, MissingScorePolicy::Exclude);

        clear_policy_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_falls_back() {
        clear_policy_env();
        env::set_var("EVAL_PASS_THRESHOLD", "eighty");
        env::set_var("EVAL_LARGE_ERROR_THRESHOLD", "NaN");
        env::set_var("EVAL_MISSING_AI_SCORE", "guess");

        let policy = EvaluationPolicy::from_env();
        assert_eq!(policy.pass_threshold, DEFAULT_PASS_THRESHOLD);
        assert_eq!(policy.large_error_threshold, DEFAULT_LARGE_ERROR_THRESHOLD);
        assert_eq!(policy.missing_ai_score, MissingScorePolicy::TreatAsZero);

        clear_policy_env();
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let policy = EvaluationPolicy {
            pass_threshold: 120.0,
            ..Default::default()
        };
        let err = policy.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "EVAL_PASS_THRESHOLD"));
    }

    #[test]
    fn test_validate_rejects_inverted_buckets() {
        let policy = EvaluationPolicy {
            confidence_medium: 0.95,
            ..Default::default()
        };
        let err = policy.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { var, .. } if var == "EVAL_CONFIDENCE_MEDIUM")
        );
    }

    #[test]
    fn test_validate_rejects_nan() {
        let policy = EvaluationPolicy {
            drift_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }
}
