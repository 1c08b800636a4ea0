use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use std::time::Instant;

use crate::models::interview::{Interview, InterviewResponse};
use crate::utils::errors::DomainError;
use crate::utils::logger::LOGGER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeFilter {
    Today,
    Past7days,
    Past30days,
    Custom,
}

impl RangeFilter {
    /// Resolves the named filter into a closed `[start, end]` date range.
    /// `custom` requires both bounds and rejects inverted ranges.
    pub fn resolve(
        &self,
        today: NaiveDate,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<(NaiveDate, NaiveDate), DomainError> {
        match self {
            RangeFilter::Today => Ok((today, today)),
            RangeFilter::Past7days => Ok((today - Duration::days(6), today)),
            RangeFilter::Past30days => Ok((today - Duration::days(29), today)),
            RangeFilter::Custom => {
                let (start, end) = match (start_date, end_date) {
                    (Some(start), Some(end)) => (start, end),
                    _ => {
                        return Err(DomainError::InvalidTimeSpecification(
                            "custom range requires start_date and end_date".to_string(),
                        ))
                    }
                };
                if start > end {
                    return Err(DomainError::InvalidTimeSpecification(format!(
                        "start_date {} is after end_date {}",
                        start, end
                    )));
                }
                Ok((start, end))
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackerFilters {
    pub interviewer_id: Option<i32>,
    pub candidate_id: Option<i32>,
    pub result: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InterviewerWorkload {
    pub interviewer_id: i32,
    pub total_interviews: i64,
    pub selected: i64,
    pub rejected: i64,
    pub cancelled: i64,
    pub pending: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_interviews: i64,
    pub selected: i64,
    pub rejected: i64,
    pub cancelled: i64,
    pub pending: i64,
}

#[derive(Debug, Serialize)]
pub struct TotalSummary {
    pub total_interviews: i64,
    pub active_interviews: i64,
    pub selected: i64,
    pub rejected: i64,
    pub cancelled: i64,
    pub pending: i64,
}

/// Read-only aggregation over the interview table. Queries run straight on
/// the pool; nothing here mutates state or holds a transaction.
#[derive(Debug, Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn interviewer_workload(
        &self,
        range: RangeFilter,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        interviewer_id: Option<i32>,
    ) -> Result<Vec<InterviewerWorkload>, DomainError> {
        let (start, end) = range.resolve(Utc::now().date_naive(), start_date, end_date)?;
        let start_time = Instant::now();

        let query = r#"
            SELECT
                interviewer_id,
                COUNT(*)::bigint AS total,
                COUNT(*) FILTER (WHERE LOWER(result) = 'selected')::bigint AS selected,
                COUNT(*) FILTER (WHERE LOWER(result) = 'rejected')::bigint AS rejected,
                COUNT(*) FILTER (WHERE LOWER(result) = 'cancelled')::bigint AS cancelled,
                COUNT(*) FILTER (WHERE LOWER(result) = 'pending')::bigint AS pending
            FROM interviews
            WHERE is_active = TRUE AND deleted_at IS NULL
              AND interview_date BETWEEN $1 AND $2
              AND ($3::int IS NULL OR interviewer_id = $3)
            GROUP BY interviewer_id
            ORDER BY total DESC
        "#;

        let rows = sqlx::query(query)
            .bind(start)
            .bind(end)
            .bind(interviewer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::db("interviewer_workload", e))?;

        let duration = start_time.elapsed();
        LOGGER.log_database_query(query, duration.as_millis(), Some(rows.len()));

        Ok(rows
            .into_iter()
            .map(|row| InterviewerWorkload {
                interviewer_id: row.get("interviewer_id"),
                total_interviews: row.get("total"),
                selected: row.get("selected"),
                rejected: row.get("rejected"),
                cancelled: row.get("cancelled"),
                pending: row.get("pending"),
            })
            .collect())
    }

    pub async fn interview_tracker(
        &self,
        range: RangeFilter,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        filters: TrackerFilters,
    ) -> Result<Vec<InterviewResponse>, DomainError> {
        let (start, end) = range.resolve(Utc::now().date_naive(), start_date, end_date)?;
        let start_time = Instant::now();

        let query = r#"
            SELECT * FROM interviews
            WHERE is_active = TRUE AND deleted_at IS NULL
              AND interview_date BETWEEN $1 AND $2
              AND ($3::int IS NULL OR interviewer_id = $3)
              AND ($4::int IS NULL OR candidate_id = $4)
              AND ($5::text IS NULL OR LOWER(result) = LOWER($5))
            ORDER BY from_time_utc ASC
        "#;

        let interviews = sqlx::query_as::<_, Interview>(query)
            .bind(start)
            .bind(end)
            .bind(filters.interviewer_id)
            .bind(filters.candidate_id)
            .bind(&filters.result)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::db("interview_tracker", e))?;

        let duration = start_time.elapsed();
        LOGGER.log_database_query(query, duration.as_millis(), Some(interviews.len()));

        // InterviewResponse::from applies display casing to `result`.
        Ok(interviews.into_iter().map(InterviewResponse::from).collect())
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> Result<SummaryReport, DomainError> {
        self.range_summary(date, date, "daily_summary").await
    }

    pub async fn monthly_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SummaryReport, DomainError> {
        if start > end {
            return Err(DomainError::InvalidTimeSpecification(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
        self.range_summary(start, end, "monthly_summary").await
    }

    pub async fn total_summary(&self) -> Result<TotalSummary, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*)::bigint AS total,
                COUNT(*) FILTER (WHERE is_active = TRUE AND deleted_at IS NULL)::bigint AS active,
                COUNT(*) FILTER (WHERE LOWER(result) = 'selected')::bigint AS selected,
                COUNT(*) FILTER (WHERE LOWER(result) = 'rejected')::bigint AS rejected,
                COUNT(*) FILTER (WHERE LOWER(result) = 'cancelled')::bigint AS cancelled,
                COUNT(*) FILTER (WHERE LOWER(result) = 'pending')::bigint AS pending
            FROM interviews
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::db("total_summary", e))?;

        Ok(TotalSummary {
            total_interviews: row.get("total"),
            active_interviews: row.get("active"),
            selected: row.get("selected"),
            rejected: row.get("rejected"),
            cancelled: row.get("cancelled"),
            pending: row.get("pending"),
        })
    }

    async fn range_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        operation: &str,
    ) -> Result<SummaryReport, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*)::bigint AS total,
                COUNT(*) FILTER (WHERE LOWER(result) = 'selected')::bigint AS selected,
                COUNT(*) FILTER (WHERE LOWER(result) = 'rejected')::bigint AS rejected,
                COUNT(*) FILTER (WHERE LOWER(result) = 'cancelled')::bigint AS cancelled,
                COUNT(*) FILTER (WHERE LOWER(result) = 'pending')::bigint AS pending
            FROM interviews
            WHERE is_active = TRUE AND deleted_at IS NULL
              AND interview_date BETWEEN $1 AND $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::db(operation, e))?;

        Ok(SummaryReport {
            start_date: start,
            end_date: end,
            total_interviews: row.get("total"),
            selected: row.get("selected"),
            rejected: row.get("rejected"),
            cancelled: row.get("cancelled"),
            pending: row.get("pending"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::display_result;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_resolves_to_a_single_day() {
        let today = day(2025, 6, 15);
        assert_eq!(
            RangeFilter::Today.resolve(today, None, None).unwrap(),
            (today, today)
        );
    }

    #[test]
    fn past7days_covers_seven_calendar_days_inclusive() {
        let today = day(2025, 6, 15);
        assert_eq!(
            RangeFilter::Past7days.resolve(today, None, None).unwrap(),
            (day(2025, 6, 9), today)
        );
    }

    #[test]
    fn past30days_covers_thirty_calendar_days_inclusive() {
        let today = day(2025, 6, 15);
        assert_eq!(
            RangeFilter::Past30days.resolve(today, None, None).unwrap(),
            (day(2025, 5, 17), today)
        );
    }

    #[test]
    fn custom_requires_both_bounds() {
        let today = day(2025, 6, 15);
        let err = RangeFilter::Custom
            .resolve(today, Some(day(2025, 6, 1)), None)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTimeSpecification(_)));
    }

    #[test]
    fn custom_rejects_inverted_ranges() {
        let today = day(2025, 6, 15);
        let err = RangeFilter::Custom
            .resolve(today, Some(day(2025, 6, 10)), Some(day(2025, 6, 1)))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTimeSpecification(_)));
    }

    #[test]
    fn custom_accepts_explicit_range() {
        let today = day(2025, 6, 15);
        assert_eq!(
            RangeFilter::Custom
                .resolve(today, Some(day(2025, 5, 1)), Some(day(2025, 5, 31)))
                .unwrap(),
            (day(2025, 5, 1), day(2025, 5, 31))
        );
    }

    #[test]
    fn display_casing_is_applied_by_the_response_mapping() {
        assert_eq!(display_result("selected"), "Selected");
        assert_eq!(display_result("CANCELLED"), "Cancelled");
    }
}
