//! Test utilities and mock factories.
//!
//! This module provides shared testing infrastructure:
//! - Mock implementations for traits
//! - Record and batch factories
//! - Common test helpers
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::error::StorageError;
use crate::evaluation::{ModelInfo, VerificationRecord};
use crate::traits::{MockTimeProvider, MockVerificationSource};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// A fixed instant used as "now" across tests.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
}

/// Create a mock time provider that always returns the given time.
#[must_use]
pub fn mock_time_provider(time: DateTime<Utc>) -> MockTimeProvider {
    let mut mock = MockTimeProvider::new();
    mock.expect_now().returning(move || time);
    mock
}

/// Create a labeled record `minutes` after [`fixed_time`] minus one day.
#[must_use]
pub fn labeled_record(id: &str, minutes: i64, ai: f64, expert: f64) -> VerificationRecord {
    let start = fixed_time() - Duration::days(1);
    VerificationRecord::new(id, start + Duration::minutes(minutes), ai, Some(expert), 0.85)
}

/// Build a chronologically increasing batch of `size` labeled records whose
/// early half has `early_correct` agreeing pairs and whose recent half has
/// `recent_correct`.
///
/// Agreeing pairs score 90 on both sides; disagreeing pairs score 30 vs 90.
#[must_use]
pub fn split_batch(size: usize, early_correct: usize, recent_correct: usize) -> Vec<VerificationRecord> {
    let half = size / 2;
    (0..size)
        .map(|i| {
            let (offset, correct) = if i < half {
                (i, early_correct)
            } else {
                (i - half, recent_correct)
            };
            let ai = if offset < correct { 90.0 } else { 30.0 };
            labeled_record(&format!("rec-{i:04}"), i64::try_from(i).unwrap(), ai, 90.0)
        })
        .collect()
}

/// Create a mock source that knows one model and returns the given batch.
#[must_use]
pub fn mock_source_with(model: ModelInfo, records: Vec<VerificationRecord>) -> MockVerificationSource {
    let mut mock = MockVerificationSource::new();
    let known_id = model.id.clone();
    mock.expect_get_model().returning(move |id| {
        Ok((id == known_id).then(|| model.clone()))
    });
    mock.expect_get_verifications()
        .returning(move |_, _| Ok(records.clone()));
    mock
}

/// Create a mock source whose every call fails.
#[must_use]
pub fn mock_source_error(error: StorageError) -> MockVerificationSource {
    let mut mock = MockVerificationSource::new();
    let for_model = error.clone();
    mock.expect_get_model()
        .returning(move |_| Err(for_model.clone()));
    mock.expect_get_verifications()
        .returning(move |_, _| Err(error.clone()));
    mock
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{TimeProvider, VerificationSource};

    #[test]
    fn test_mock_time_provider() {
        let provider = mock_time_provider(fixed_time());
        assert_eq!(provider.now(), fixed_time());
    }

    #[test]
    fn test_split_batch_shape() {
        let batch = split_batch(10, 5, 3);
        assert_eq!(batch.len(), 10);
        let early_wrong = batch[..5].iter().filter(|r| r.ai_score.value() == Some(30.0)).count();
        let recent_wrong = batch[5..].iter().filter(|r| r.ai_score.value() == Some(30.0)).count();
        assert_eq!(early_wrong, 0);
        assert_eq!(recent_wrong, 2);
        assert!(batch.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[tokio::test]
    async fn test_mock_source_with() {
        let source = mock_source_with(ModelInfo::new("m", "M", "cat"), split_batch(4, 2, 2));
        assert!(source.get_model("m").await.unwrap().is_some());
        assert!(source.get_model("other").await.unwrap().is_none());

        let model = ModelInfo::new("m", "M", "cat");
        let records = source.get_verifications(&model, fixed_time()).await.unwrap();
        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn test_mock_source_error() {
        let source = mock_source_error(StorageError::Internal {
            message: "boom".into(),
        });
        assert!(source.get_model("m").await.is_err());
    }
}
