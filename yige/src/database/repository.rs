//! Repository layer for database operations
//!
//! Day record CRUD plus the key/value rows backing the session store.
//! Records never have their content or metadata rewritten; only the style
//! can change after creation.

use super::models::*;
use crate::artifact::ArtifactStyle;
use crate::error::{AppError, Result};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new record
    pub async fn create_record(&self, req: NewDayRecord) -> Result<DayRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let metadata_json = req
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let row = sqlx::query_as::<_, DayRecordRow>(
            r#"
            INSERT INTO day_records
                (id, owner_id, content, mood, weather, event_type, day, created_at, style, metadata_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.owner_id)
        .bind(&req.content)
        .bind(req.mood.as_str())
        .bind(req.weather.map(|w| w.as_str()))
        .bind(req.event_type.map(|e| e.as_str()))
        .bind(req.day)
        .bind(now)
        .bind(req.style.as_str())
        .bind(metadata_json)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created record: {}", id);
        row.try_into()
    }

    /// Get a record by ID
    pub async fn get_record(&self, id: &str) -> Result<DayRecord> {
        let row = sqlx::query_as::<_, DayRecordRow>("SELECT * FROM day_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::RecordNotFound(id.to_string()))?;

        row.try_into()
    }

    /// All records of an owner, newest day first
    pub async fn list_records(&self, owner_id: &str) -> Result<Vec<DayRecord>> {
        let rows = sqlx::query_as::<_, DayRecordRow>(
            r#"
            SELECT * FROM day_records
            WHERE owner_id = ?
            ORDER BY day DESC, created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DayRecord::try_from).collect()
    }

    /// Records of an owner whose day falls in `start..=end`, oldest first
    pub async fn list_records_between(
        &self,
        owner_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayRecord>> {
        let rows = sqlx::query_as::<_, DayRecordRow>(
            r#"
            SELECT * FROM day_records
            WHERE owner_id = ? AND day >= ? AND day <= ?
            ORDER BY day ASC, created_at ASC
            "#,
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DayRecord::try_from).collect()
    }

    /// Re-select the artifact style of one of an owner's records
    pub async fn update_style(
        &self,
        id: &str,
        owner_id: &str,
        style: ArtifactStyle,
    ) -> Result<DayRecord> {
        let rows = sqlx::query("UPDATE day_records SET style = ? WHERE id = ? AND owner_id = ?")
            .bind(style.as_str())
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::RecordNotFound(id.to_string()));
        }

        tracing::debug!("Record {} restyled as {}", id, style);
        self.get_record(id).await
    }

    /// Permanently delete one of an owner's records
    pub async fn delete_record(&self, id: &str, owner_id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM day_records WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::RecordNotFound(id.to_string()));
        }

        tracing::debug!("Deleted record: {}", id);
        Ok(())
    }

    /// Move every record of one owner to another, returning how many moved
    pub async fn reassign_owner(&self, from_owner: &str, to_owner: &str) -> Result<u64> {
        let moved = sqlx::query("UPDATE day_records SET owner_id = ? WHERE owner_id = ?")
            .bind(to_owner)
            .bind(from_owner)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Reassigned {} records from {} to {}", moved, from_owner, to_owner);
        Ok(moved)
    }

    /// Get/set/delete session values
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    pub async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::debug!("Stored session value: {}", key);
        Ok(())
    }

    /// Add `delta` to an integer value in one statement, never going below
    /// zero. A missing or unreadable value counts as zero.
    pub async fn adjust_counter(&self, key: &str, delta: i64) -> Result<u64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?, MAX(?, 0), ?)
            ON CONFLICT(key) DO UPDATE SET
                value = MAX(CAST(kv_store.value AS INTEGER) + ?, 0),
                updated_at = excluded.updated_at
            RETURNING CAST(value AS INTEGER)
            "#,
        )
        .bind(key)
        .bind(delta)
        .bind(Utc::now())
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Counter {} is now {}", key, value);
        Ok(value.max(0) as u64)
    }

    pub async fn delete_value(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Removed session value: {}", key);
        Ok(())
    }
}
