use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    models::interview::InterviewResponse,
    services::reports::{
        InterviewerWorkload, RangeFilter, ReportService, SummaryReport, TotalSummary,
        TrackerFilters,
    },
    utils::errors::DomainError,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub range: RangeFilter,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub interviewer_id: Option<i32>,
    pub candidate_id: Option<i32>,
    pub result: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn interviewer_workload(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<InterviewerWorkload>>, DomainError> {
    let report = ReportService::new(state.db.clone())
        .interviewer_workload(
            query.range,
            query.start_date,
            query.end_date,
            query.interviewer_id,
        )
        .await?;

    Ok(Json(report))
}

pub async fn interview_tracker(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<InterviewResponse>>, DomainError> {
    let filters = TrackerFilters {
        interviewer_id: query.interviewer_id,
        candidate_id: query.candidate_id,
        result: query.result,
    };

    let interviews = ReportService::new(state.db.clone())
        .interview_tracker(query.range, query.start_date, query.end_date, filters)
        .await?;

    Ok(Json(interviews))
}

pub async fn daily_summary(
    State(state): State<AppState>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<SummaryReport>, DomainError> {
    let summary = ReportService::new(state.db.clone())
        .daily_summary(query.date)
        .await?;

    Ok(Json(summary))
}

pub async fn monthly_summary(
    State(state): State<AppState>,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<SummaryReport>, DomainError> {
    let summary = ReportService::new(state.db.clone())
        .monthly_summary(query.start_date, query.end_date)
        .await?;

    Ok(Json(summary))
}

pub async fn total_summary(
    State(state): State<AppState>,
) -> Result<Json<TotalSummary>, DomainError> {
    let summary = ReportService::new(state.db.clone()).total_summary().await?;

    Ok(Json(summary))
}
