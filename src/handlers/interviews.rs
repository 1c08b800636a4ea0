use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use validator::Validate;

use crate::{
    handlers::audit_context,
    models::interview::{
        DeleteInterviewResponse, FinalizeInterviewRequest, InterviewResponse,
        ScheduleInterviewRequest, UpdateInterviewRequest,
    },
    services::scheduling::SchedulingService,
    utils::errors::DomainError,
    utils::logger::LOGGER,
    AppState,
};

pub async fn create_interview(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<ScheduleInterviewRequest>,
) -> Result<Json<InterviewResponse>, DomainError> {
    payload.validate()?;

    let ctx = audit_context(&headers);

    let interview = SchedulingService::new(state.db.clone())
        .create_interview(candidate_id, payload, &ctx)
        .await?;

    LOGGER.log_request("POST", "/candidates/:id/interviews", ctx.user_id, 200);

    Ok(Json(InterviewResponse::from(interview)))
}

pub async fn schedule_next_round(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<ScheduleInterviewRequest>,
) -> Result<Json<InterviewResponse>, DomainError> {
    payload.validate()?;

    let ctx = audit_context(&headers);

    let interview = SchedulingService::new(state.db.clone())
        .schedule_next_round(candidate_id, payload, &ctx)
        .await?;

    LOGGER.log_request(
        "POST",
        "/candidates/:id/interviews/next-round",
        ctx.user_id,
        200,
    );

    Ok(Json(InterviewResponse::from(interview)))
}

pub async fn get_interview(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<InterviewResponse>, DomainError> {
    let interview = SchedulingService::new(state.db.clone())
        .get_interview(id)
        .await?;

    Ok(Json(InterviewResponse::from(interview)))
}

pub async fn update_interview(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<UpdateInterviewRequest>,
) -> Result<Json<InterviewResponse>, DomainError> {
    payload.validate()?;

    let ctx = audit_context(&headers);

    let interview = SchedulingService::new(state.db.clone())
        .update_interview(id, payload, &ctx)
        .await?;

    LOGGER.log_request("PUT", "/interviews/:id", ctx.user_id, 200);

    Ok(Json(InterviewResponse::from(interview)))
}

pub async fn finalize_interview(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<FinalizeInterviewRequest>,
) -> Result<Json<InterviewResponse>, DomainError> {
    let ctx = audit_context(&headers);

    let interview = SchedulingService::new(state.db.clone())
        .finalize_interview(id, payload, &ctx)
        .await?;

    LOGGER.log_request("POST", "/interviews/:id/finalize", ctx.user_id, 200);

    Ok(Json(InterviewResponse::from(interview)))
}

pub async fn delete_interview(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<DeleteInterviewResponse>, DomainError> {
    let ctx = audit_context(&headers);

    let deleted = SchedulingService::new(state.db.clone())
        .delete_interview(id, &ctx)
        .await?;

    LOGGER.log_request("DELETE", "/interviews/:id", ctx.user_id, 200);

    Ok(Json(DeleteInterviewResponse {
        id: deleted.id,
        // Set by the soft-delete statement; absent only if the row never left it.
        deleted_at: deleted.deleted_at.unwrap_or(ctx.timestamp),
    }))
}
