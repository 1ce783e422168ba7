//! Error types for the model evaluator.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`EvaluationError`]: Failures that stop an evaluation before it starts
//! - [`StorageError`]: Database operation errors
//! - [`ConfigError`]: Configuration errors
//!
//! Missing expert feedback is not an error: it is reported per section through
//! [`Section::NoData`](crate::evaluation::Section). Zero-variance and
//! zero-denominator cases resolve to `0.0` and never surface here.
//!
//! All errors implement `Send + Sync` so evaluations can run on separate tasks.

use thiserror::Error;

/// Top-level application error.
///
/// This is the main error type returned by public API functions.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Evaluation error.
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Evaluation errors.
///
/// These are the only conditions under which the engine refuses to produce a
/// result object.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// The requested model does not exist in the record store.
    #[error("Model not found: {model_id}")]
    ModelNotFound {
        /// The model ID that was not found.
        model_id: String,
    },

    /// A record in the input batch does not conform to the expected shape.
    #[error("Schema violation in record '{record_id}': {field} {reason}")]
    SchemaViolation {
        /// Identifier of the offending record.
        record_id: String,
        /// The field that failed validation.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// The lookback window is empty.
    #[error("Invalid lookback window: {days} days")]
    InvalidLookback {
        /// Requested window length.
        days: u32,
    },
}

impl EvaluationError {
    /// Build a schema violation for a record field.
    #[must_use]
    pub fn schema(
        record_id: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaViolation {
            record_id: record_id.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Storage errors.
///
/// These errors represent failures in database operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failed to connect to the database.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// A database query failed.
    #[error("Query failed: {query} - {message}")]
    QueryFailed {
        /// The query that failed (may be truncated).
        query: String,
        /// Description of the failure.
        message: String,
    },

    /// Database migration failed.
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed {
        /// The migration version that failed.
        version: String,
        /// Description of the failure.
        message: String,
    },

    /// Internal storage error.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    // Type assertions - verify all errors implement required traits
    assert_impl_all!(AppError: Send, Sync, std::error::Error);
    assert_impl_all!(EvaluationError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(StorageError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(ConfigError: Send, Sync, std::error::Error, Clone);

    #[test]
    fn test_app_error_display_evaluation() {
        let err = AppError::Evaluation(EvaluationError::ModelNotFound {
            model_id: "model-42".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Evaluation error: Model not found: model-42"
        );
    }

    #[test]
    fn test_app_error_display_storage() {
        let err = AppError::Storage(StorageError::ConnectionFailed {
            message: "refused".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Storage error: Database connection failed: refused"
        );
    }

    #[test]
    fn test_app_error_display_config() {
        let err = AppError::Config(ConfigError::MissingRequired {
            var: "EVAL_MODEL_IDS".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required: EVAL_MODEL_IDS"
        );
    }

    #[test]
    fn test_schema_violation_display() {
        let err = EvaluationError::schema("rec-1", "confidence_score", "must be within [0, 1]");
        assert_eq!(
            err.to_string(),
            "Schema violation in record 'rec-1': confidence_score must be within [0, 1]"
        );
    }

    #[test]
    fn test_invalid_lookback_display() {
        let err = EvaluationError::InvalidLookback { days: 0 };
        assert_eq!(err.to_string(), "Invalid lookback window: 0 days");
    }

    #[test]
    fn test_storage_error_display_query_failed() {
        let err = StorageError::QueryFailed {
            query: "SELECT verifications".to_string(),
            message: "no such table".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Query failed: SELECT verifications - no such table"
        );
    }

    #[test]
    fn test_storage_error_display_migration() {
        let err = StorageError::MigrationFailed {
            version: "001".to_string(),
            message: "syntax error".to_string(),
        };
        assert_eq!(err.to_string(), "Migration failed: 001 - syntax error");
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            var: "EVAL_LOOKBACK_DAYS".to_string(),
            reason: "must be between 1 and 365".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for EVAL_LOOKBACK_DAYS: must be between 1 and 365"
        );
    }

    #[test]
    fn test_from_conversions() {
        let app: AppError = StorageError::Internal {
            message: "x".into(),
        }
        .into();
        assert!(matches!(app, AppError::Storage(_)));

        let app: AppError = ConfigError::MissingRequired { var: "X".into() }.into();
        assert!(matches!(app, AppError::Config(_)));

        let app: AppError = EvaluationError::InvalidLookback { days: 0 }.into();
        assert!(matches!(app, AppError::Evaluation(_)));
    }

    #[test]
    fn test_error_equality() {
        let a = EvaluationError::schema("r", "f", "bad");
        let b = EvaluationError::schema("r", "f", "bad");
        assert_eq!(a, b);
        assert_ne!(a, EvaluationError::InvalidLookback { days: 1 });
    }
}
