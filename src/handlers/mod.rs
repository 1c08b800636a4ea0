pub mod interviews;
pub mod reports;
pub mod retention;

use axum::http::HeaderMap;
use chrono::Utc;

use crate::models::audit::AuditContext;

/// Builds the audit context from headers forwarded by the upstream gateway.
/// Authentication itself happens before requests reach this service.
pub fn audit_context(headers: &HeaderMap) -> AuditContext {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i32>().ok());

    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    AuditContext {
        user_id,
        ip_address,
        user_agent,
        timestamp: Utc::now(),
    }
}
