//! Verification record and expert feedback storage operations.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use crate::evaluation::{Score, VerificationRecord};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::core::SqliteStorage;

impl SqliteStorage {
    /// Insert a verification without feedback.
    ///
    /// The AI score is stored as `{"score": n}` in the `ai_result` column,
    /// or `{}` when absent.
    pub async fn save_verification(
        &self,
        verification_type: &str,
        record: &VerificationRecord,
    ) -> Result<(), StorageError> {
        let ai_result = match record.ai_score {
            Score::Present(score) => json!({ "score": score }),
            Score::Absent => json!({}),
        };

        sqlx::query(
            r"
            INSERT INTO verifications (id, verification_type, ai_result, confidence_score, created_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(&record.id)
        .bind(verification_type)
        .bind(ai_result.to_string())
        .bind(record.confidence_score)
        .bind(Self::format_datetime(record.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| Self::query_error("INSERT verifications", format!("{e}")))?;

        Ok(())
    }

    /// Insert or replace the expert feedback for a verification.
    pub async fn save_feedback(
        &self,
        verification_id: &str,
        expert_score: f64,
        detailed_feedback: Option<&Value>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO expert_feedback (verification_id, expert_score, detailed_feedback, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(verification_id) DO UPDATE SET
                expert_score = excluded.expert_score,
                detailed_feedback = excluded.detailed_feedback
            ",
        )
        .bind(verification_id)
        .bind(expert_score)
        .bind(detailed_feedback.map(Value::to_string))
        .bind(Self::format_datetime(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| Self::query_error("INSERT expert_feedback", format!("{e}")))?;

        Ok(())
    }

    /// Insert a verification and, if it has one, its expert feedback.
    pub async fn save_record(
        &self,
        verification_type: &str,
        record: &VerificationRecord,
    ) -> Result<(), StorageError> {
        self.save_verification(verification_type, record).await?;
        if let Some(expert_score) = record.expert_score {
            self.save_feedback(&record.id, expert_score, record.detailed_feedback.as_ref())
                .await?;
        }
        Ok(())
    }

    /// Load verifications of one type created at or after `since`, joined
    /// with their feedback, in chronological order.
    pub async fn get_verification_records(
        &self,
        verification_type: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<VerificationRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT v.id, v.ai_result, v.confidence_score, v.created_at,
                   f.expert_score, f.detailed_feedback
            FROM verifications v
            LEFT JOIN expert_feedback f ON f.verification_id = v.id
            WHERE v.verification_type = ? AND v.created_at >= ?
            ORDER BY v.created_at, v.id
            ",
        )
        .bind(verification_type)
        .bind(Self::format_datetime(since))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::query_error("SELECT verifications", format!("{e}")))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    fn row_to_record(row: &SqliteRow) -> Result<VerificationRecord, StorageError> {
        let id: String = row.get("id");
        let ai_result: Option<String> = row.get("ai_result");
        let confidence_score: f64 = row.get("confidence_score");
        let created_at_str: String = row.get("created_at");
        let expert_score: Option<f64> = row.get("expert_score");
        let detailed_feedback: Option<String> = row.get("detailed_feedback");

        let created_at = Self::parse_datetime(&created_at_str)?;
        let ai_score = parse_ai_score(&id, ai_result.as_deref())?;

        let mut record =
            VerificationRecord::new(id, created_at, ai_score, expert_score, confidence_score);
        if let Some(raw) = detailed_feedback {
            let feedback = serde_json::from_str(&raw).map_err(|e| StorageError::Internal {
                message: format!("Invalid detailed_feedback for '{}': {e}", record.id),
            })?;
            record = record.with_feedback(feedback);
        }
        Ok(record)
    }
}

/// Extract the score from an `ai_result` JSON document.
///
/// A missing document, a non-object document or a missing `score` key all
/// yield [`Score::Absent`].
pub(crate) fn parse_ai_score(id: &str, ai_result: Option<&str>) -> Result<Score, StorageError> {
    let Some(raw) = ai_result else {
        return Ok(Score::Absent);
    };
    let doc: Value = serde_json::from_str(raw).map_err(|e| StorageError::Internal {
        message: format!("Invalid ai_result for '{id}': {e}"),
    })?;

    match doc.get("score") {
        None | Some(Value::Null) => Ok(Score::Absent),
        Some(value) => value
            .as_f64()
            .map(Score::Present)
            .ok_or_else(|| StorageError::Internal {
                message: format!("Non-numeric ai_result.score for '{id}': {value}"),
            }),
    }
}
