use std::collections::HashMap;

use sqlx::PgPool;

use crate::utils::errors::DomainError;
use crate::utils::logger::LOGGER;

/// Grace period between soft delete and physical removal.
pub const RETENTION_GRACE_DAYS: i32 = 15;

/// Periodic purge of long-soft-deleted interviews. Runs from the cron job in
/// `main.rs`; also triggerable through the admin endpoint.
#[derive(Debug, Clone)]
pub struct RetentionService {
    pool: PgPool,
}

impl RetentionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Physically removes interviews that were soft-deleted more than
    /// `RETENTION_GRACE_DAYS` ago, but only once the linked candidate and
    /// interviewer are each soft-deleted or gone themselves. A single
    /// transaction covers the whole batch. Returns the purge count.
    pub async fn permanently_delete_old_interviews(&self) -> Result<u64, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::db("begin_retention_sweep", e))?;

        let result = sqlx::query(
            r#"
            DELETE FROM interviews i
            WHERE i.deleted_at IS NOT NULL
              AND i.deleted_at < NOW() - make_interval(days => $1)
              AND NOT EXISTS (
                  SELECT 1 FROM candidates c
                  WHERE c.id = i.candidate_id AND c.deleted_at IS NULL
              )
              AND NOT EXISTS (
                  SELECT 1 FROM interviewers w
                  WHERE w.id = i.interviewer_id AND w.deleted_at IS NULL
              )
            "#,
        )
        .bind(RETENTION_GRACE_DAYS)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::db("retention_sweep", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::db("commit_retention_sweep", e))?;

        let purged = result.rows_affected();

        let mut metadata = HashMap::new();
        metadata.insert(
            "purged_count".to_string(),
            serde_json::Value::Number(purged.into()),
        );
        LOGGER.log_business_event("retention_sweep_completed", None, metadata);

        Ok(purged)
    }
}
