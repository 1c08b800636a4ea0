use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::{
    handlers::audit_context, services::retention::RetentionService, utils::errors::DomainError,
    utils::logger::LOGGER, AppState,
};

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub message: String,
    pub purged_count: u64,
}

/// Manual trigger for the retention sweep; the scheduled job in `main.rs`
/// runs the same service daily.
pub async fn trigger_sweep(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<SweepResponse>, DomainError> {
    let ctx = audit_context(&headers);

    let purged_count = RetentionService::new(state.db.clone())
        .permanently_delete_old_interviews()
        .await?;

    LOGGER.log_request("POST", "/admin/retention/sweep", ctx.user_id, 200);

    Ok(Json(SweepResponse {
        message: format!(
            "Purged {} interviews soft-deleted for more than 15 days",
            purged_count
        ),
        purged_count,
    }))
}
