//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading
//! - Configuration validation
//! - Default value handling
//! - The [`EvaluationPolicy`] thresholds used by the engine
//!
//! # Example
//!
//! ```
//! use model_evaluator::config::{Config, EvaluationPolicy, DEFAULT_LOOKBACK_DAYS};
//!
//! // Create a config directly (use Config::from_env() in production)
//! let config = Config {
//!     database_path: "./data/evaluations.db".to_string(),
//!     log_level: "info".to_string(),
//!     model_ids: vec!["model-a".to_string()],
//!     lookback_days: DEFAULT_LOOKBACK_DAYS,
//!     policy: EvaluationPolicy::default(),
//! };
//!
//! assert_eq!(config.lookback_days, 30);
//! ```

mod policy;
mod validation;

pub use policy::{
    EvaluationPolicy, DEFAULT_CONFIDENCE_HIGH, DEFAULT_CONFIDENCE_MEDIUM,
    DEFAULT_DRIFT_THRESHOLD, DEFAULT_HIGH_CONFIDENCE_ERROR, DEFAULT_LARGE_ERROR_ALERT_PCT,
    DEFAULT_LARGE_ERROR_THRESHOLD, DEFAULT_MIN_ACCURACY, DEFAULT_MIN_CORRELATION,
    DEFAULT_OUTLIER_IQR_MULTIPLIER, DEFAULT_PASS_THRESHOLD, DEFAULT_PATTERN_MAJORITY,
};
pub use validation::{validate_config, MAX_LOOKBACK_DAYS, MIN_LOOKBACK_DAYS};

use crate::error::ConfigError;

/// Default database path.
pub const DEFAULT_DATABASE_PATH: &str = "./data/evaluations.db";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default lookback window in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Database path.
    pub database_path: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Models to evaluate in this run.
    pub model_ids: Vec<String>,
    /// Lookback window in days.
    pub lookback_days: u32,
    /// Evaluation thresholds.
    pub policy: EvaluationPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `EVAL_MODEL_IDS`: comma-separated model identifiers
    ///
    /// Optional environment variables (with defaults):
    /// - `DATABASE_PATH`: Path to `SQLite` database (default: `./data/evaluations.db`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `EVAL_LOOKBACK_DAYS`: Lookback window (default: `30`)
    /// - policy overrides, see [`EvaluationPolicy::from_env`]
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `EVAL_MODEL_IDS` is missing
    /// - `EVAL_LOOKBACK_DAYS` is not a valid positive integer
    /// - Any value fails validation (see [`validate_config`])
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let raw_ids = std::env::var("EVAL_MODEL_IDS").map_err(|_| ConfigError::MissingRequired {
            var: "EVAL_MODEL_IDS".into(),
        })?;
        let model_ids = parse_model_ids(&raw_ids);

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let lookback_days = parse_env_u32("EVAL_LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS)?;

        let config = Self {
            database_path,
            log_level,
            model_ids,
            lookback_days,
            policy: EvaluationPolicy::from_env(),
        };

        validate_config(&config)?;
        Ok(config)
    }
}

/// Split a comma-separated list, dropping blanks and duplicates.
fn parse_model_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}
