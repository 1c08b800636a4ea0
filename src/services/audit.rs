use sqlx::{Postgres, Transaction};

use crate::models::audit::{AuditAction, AuditContext};
use crate::utils::errors::DomainError;

/// Writes one audit row inside the caller's transaction, so the event
/// commits and rolls back together with the mutation it describes.
pub async fn log_action(
    tx: &mut Transaction<'_, Postgres>,
    ctx: &AuditContext,
    action: AuditAction,
    interview_id: i32,
    old_values: Option<serde_json::Value>,
    new_values: Option<serde_json::Value>,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs
            (user_id, action, entity_type, entity_id, old_values, new_values,
             ip_address, user_agent, created_at)
        VALUES ($1, $2, 'interview', $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(ctx.user_id)
    .bind(action.as_str())
    .bind(interview_id)
    .bind(old_values)
    .bind(new_values)
    .bind(&ctx.ip_address)
    .bind(&ctx.user_agent)
    .bind(ctx.timestamp)
    .execute(&mut **tx)
    .await
    .map_err(|e| DomainError::db("audit_log_insert", e))?;

    Ok(())
}
