//! Configuration validation.
//!
//! This module provides validation logic for configuration values,
//! ensuring they are within acceptable ranges.

use super::Config;
use crate::error::ConfigError;

/// Minimum allowed lookback window in days.
pub const MIN_LOOKBACK_DAYS: u32 = 1;

/// Maximum allowed lookback window in days.
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `EVAL_MODEL_IDS` must name at least one model
/// - `EVAL_LOOKBACK_DAYS` must be between 1 and 365
/// - `DATABASE_PATH` must not be empty
/// - the evaluation policy must pass [`EvaluationPolicy::validate`](super::EvaluationPolicy::validate)
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.model_ids.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "EVAL_MODEL_IDS".into(),
            reason: "must name at least one model".into(),
        });
    }

    if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&config.lookback_days) {
        return Err(ConfigError::InvalidValue {
            var: "EVAL_LOOKBACK_DAYS".into(),
            reason: format!("must be between {MIN_LOOKBACK_DAYS} and {MAX_LOOKBACK_DAYS}"),
        });
    }

    if config.database_path.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "DATABASE_PATH".into(),
            reason: "must not be empty".into(),
        });
    }

    config.policy.validate()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::EvaluationPolicy;

    fn create_valid_config() -> Config {
        Config {
            database_path: "./data/evaluations.db".to_string(),
            log_level: "info".to_string(),
            model_ids: vec!["model-a".to_string()],
            lookback_days: 30,
            policy: EvaluationPolicy::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = create_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_model_ids() {
        let mut config = create_valid_config();
        config.model_ids.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "EVAL_MODEL_IDS"));
    }

    #[test]
    fn test_lookback_zero() {
        let mut config = create_valid_config();
        config.lookback_days = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { var, .. } if var == "EVAL_LOOKBACK_DAYS")
        );
    }

    #[test]
    fn test_lookback_too_long() {
        let mut config = create_valid_config();
        config.lookback_days = MAX_LOOKBACK_DAYS + 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_boundary_lookback() {
        let mut config = create_valid_config();
        config.lookback_days = MIN_LOOKBACK_DAYS;
        assert!(validate_config(&config).is_ok());
        config.lookback_days = MAX_LOOKBACK_DAYS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_blank_database_path() {
        let mut config = create_valid_config();
        config.database_path = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "DATABASE_PATH"));
    }

    #[test]
    fn test_policy_errors_propagate() {
        let mut config = create_valid_config();
        config.policy.pattern_majority = 1.5;
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { var, .. } if var == "EVAL_PATTERN_MAJORITY")
        );
    }
}
