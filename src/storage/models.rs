//! Model metadata storage operations.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use crate::evaluation::ModelInfo;
use chrono::Utc;
use sqlx::Row;

use super::core::SqliteStorage;

impl SqliteStorage {
    /// Insert or replace a model.
    pub async fn save_model(&self, model: &ModelInfo) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO models (id, name, verification_category, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                verification_category = excluded.verification_category
            ",
        )
        .bind(&model.id)
        .bind(&model.name)
        .bind(&model.verification_category)
        .bind(Self::format_datetime(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| Self::query_error("INSERT models", format!("{e}")))?;

        Ok(())
    }

    /// Get a model by ID.
    pub async fn get_stored_model(&self, id: &str) -> Result<Option<ModelInfo>, StorageError> {
        let row = sqlx::query("SELECT id, name, verification_category FROM models WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT models", format!("{e}")))?;

        Ok(row.map(|row| {
            let id: String = row.get("id");
            let name: String = row.get("name");
            let category: String = row.get("verification_category");
            ModelInfo::new(id, name, category)
        }))
    }

    /// List all model IDs.
    pub async fn list_model_ids(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT id FROM models ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT models", format!("{e}")))?;

        Ok(rows.iter().map(|row| row.get("id")).collect())
    }
}
