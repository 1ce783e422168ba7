//! `VerificationSource` implementation for `SqliteStorage`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::evaluation::{ModelInfo, VerificationRecord};
use crate::traits::VerificationSource;

use super::core::SqliteStorage;

#[async_trait]
impl VerificationSource for SqliteStorage {
    async fn get_model(&self, model_id: &str) -> Result<Option<ModelInfo>, StorageError> {
        self.get_stored_model(model_id).await
    }

    async fn get_verifications(
        &self,
        model: &ModelInfo,
        since: DateTime<Utc>,
    ) -> Result<Vec<VerificationRecord>, StorageError> {
        self.get_verification_records(&model.verification_category, since)
            .await
    }
}
