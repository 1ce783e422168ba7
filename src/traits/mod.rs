//! Trait abstractions for dependency injection.
//!
//! This module provides traits that abstract external dependencies:
//! - [`VerificationSource`]: Loading models and their verification records
//! - [`TimeProvider`]: Time abstraction for testing
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use model_evaluator::traits::{TimeProvider, RealTimeProvider};
//!
//! let time_provider = RealTimeProvider;
//! let now = time_provider.now();
//! println!("Current time: {now}");
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::evaluation::{ModelInfo, VerificationRecord};

/// Source of models and their verification records.
///
/// The evaluation engine itself never touches storage; it is handed a
/// batch loaded through this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationSource: Send + Sync {
    /// Look up a model by ID.
    ///
    /// Returns `None` if the model doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the lookup fails.
    async fn get_model(&self, model_id: &str) -> Result<Option<ModelInfo>, StorageError>;

    /// Load the model's verification records created at or after `since`,
    /// joined with any expert feedback.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails or a stored row is malformed.
    async fn get_verifications(
        &self,
        model: &ModelInfo,
        since: DateTime<Utc>,
    ) -> Result<Vec<VerificationRecord>, StorageError>;
}

/// Time provider trait for deterministic testing.
///
/// This trait abstracts time operations to allow for
/// deterministic testing by providing fixed timestamps.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
///
/// This is the production implementation that returns the actual current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time provider pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeProvider(pub DateTime<Utc>);

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.0
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
    use chrono::TimeZone;
    use static_assertions::assert_impl_all;

    // Verify provider traits
    assert_impl_all!(RealTimeProvider: Send, Sync, Clone, Copy, Default);
    assert_impl_all!(FixedTimeProvider: Send, Sync, Clone, Copy);

    // RealTimeProvider Tests
    #[test]
    fn test_real_time_provider_now() {
        let provider = RealTimeProvider;
        let before = Utc::now();
        let now = provider.now();
        let after = Utc::now();
        assert!(now >= before);
        assert!(now <= after);
    }

    #[test]
    fn test_real_time_provider_debug() {
        let provider = RealTimeProvider;
        let debug = format!("{provider:?}");
        assert!(debug.contains("RealTimeProvider"));
    }

    #[test]
    fn test_fixed_time_provider() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let provider = FixedTimeProvider(instant);
        assert_eq!(provider.now(), instant);
        assert_eq!(provider.now(), provider.now());
    }

    // Mock Verification Tests
    #[test]
    fn test_mock_time_provider() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let mut mock = MockTimeProvider::new();
        mock.expect_now().returning(move || fixed_time);

        assert_eq!(mock.now(), fixed_time);
    }

    #[tokio::test]
    async fn test_mock_source_get_model() {
        let mut mock = MockVerificationSource::new();
        mock.expect_get_model()
            .with(mockall::predicate::eq("model-1"))
            .returning(|id| Ok(Some(ModelInfo::new(id, "Contract Checker", "contract"))));

        let model = mock.get_model("model-1").await.unwrap().unwrap();
        assert_eq!(model.id, "model-1");
        assert_eq!(model.verification_category, "contract");
    }

    #[tokio::test]
    async fn test_mock_source_model_not_found() {
        let mut mock = MockVerificationSource::new();
        mock.expect_get_model().returning(|_| Ok(None));

        assert!(mock.get_model("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_source_error() {
        let mut mock = MockVerificationSource::new();
        mock.expect_get_verifications().returning(|_, _| {
            Err(StorageError::QueryFailed {
                query: "SELECT".to_string(),
                message: "disk I/O error".to_string(),
            })
        });

        let model = ModelInfo::new("m", "M", "cat");
        let result = mock.get_verifications(&model, Utc::now()).await;
        assert!(matches!(result, Err(StorageError::QueryFailed { .. })));
    }
}
