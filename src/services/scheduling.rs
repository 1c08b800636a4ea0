use std::collections::HashMap;

use chrono::Duration;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::audit::{AuditAction, AuditContext};
use crate::models::candidate::CandidateStatus;
use crate::models::interview::{
    FinalizeInterviewRequest, Interview, ScheduleInterviewRequest, UpdateInterviewRequest,
};
use crate::services::{audit, conflict, rounds, timezone};
use crate::services::conflict::Axis;
use crate::utils::errors::DomainError;
use crate::utils::logger::LOGGER;

/// Orchestrates the interview lifecycle. Every mutating operation runs in
/// exactly one transaction: the overlap check and the write share it, commit
/// happens only at the end, and any early error return drops the transaction,
/// which rolls it back and releases the connection.
#[derive(Debug, Clone)]
pub struct SchedulingService {
    pool: PgPool,
}

impl SchedulingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_interview(&self, id: i32) -> Result<Interview, DomainError> {
        sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::db("get_interview", e))?
        .ok_or(DomainError::InterviewNotFound(id))
    }

    pub async fn create_interview(
        &self,
        candidate_id: i32,
        request: ScheduleInterviewRequest,
        ctx: &AuditContext,
    ) -> Result<Interview, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::db("begin_create_interview", e))?;

        verify_candidate_schedulable(&mut tx, candidate_id).await?;
        let interview = insert_scheduled_interview(&mut tx, candidate_id, &request, ctx).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::db("commit_create_interview", e))?;

        log_schedule_event("interview_created", &interview, ctx);
        Ok(interview)
    }

    /// Identical time and overlap handling to `create_interview`, but only
    /// valid for candidates that already have interview history; the round
    /// sequence simply continues.
    pub async fn schedule_next_round(
        &self,
        candidate_id: i32,
        request: ScheduleInterviewRequest,
        ctx: &AuditContext,
    ) -> Result<Interview, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::db("begin_schedule_next_round", e))?;

        verify_candidate_schedulable(&mut tx, candidate_id).await?;

        if !rounds::has_prior_interviews(&mut tx, candidate_id).await? {
            return Err(DomainError::NoPriorInterview(candidate_id));
        }

        let interview = insert_scheduled_interview(&mut tx, candidate_id, &request, ctx).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::db("commit_schedule_next_round", e))?;

        log_schedule_event("interview_next_round_scheduled", &interview, ctx);
        Ok(interview)
    }

    pub async fn update_interview(
        &self,
        id: i32,
        patch: UpdateInterviewRequest,
        ctx: &AuditContext,
    ) -> Result<Interview, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::db("begin_update_interview", e))?;

        let existing = load_active_interview(&mut tx, id).await?;

        if let Some(new_candidate) = patch.candidate_id {
            if new_candidate != existing.candidate_id {
                verify_candidate_schedulable(&mut tx, new_candidate).await?;
            }
        }

        let candidate_id = patch.candidate_id.unwrap_or(existing.candidate_id);
        let interviewer_id = patch.interviewer_id.unwrap_or(existing.interviewer_id);

        // A rescheduling patch must carry date, time and zone as a unit;
        // duration alone falls back to the stored value.
        let new_bounds = if patch.touches_schedule() {
            if !patch.has_complete_time_fields() {
                return Err(DomainError::InvalidTimeUpdate);
            }
            let date = patch.interview_date.unwrap_or(existing.interview_date);
            let time = patch.from_time.unwrap_or(existing.from_time_local);
            let zone = patch
                .event_timezone
                .as_deref()
                .unwrap_or(&existing.event_timezone);
            let duration = patch.duration_minutes.unwrap_or(existing.duration_minutes);

            let from_utc = timezone::build_utc_instant(date, time, zone)?;
            Some((from_utc, from_utc + Duration::minutes(duration as i64)))
        } else {
            None
        };

        // The non-overlap invariant must survive moves to another candidate
        // or interviewer even when the slot itself is unchanged.
        let candidate_changed = candidate_id != existing.candidate_id;
        let axis_changed =
            candidate_changed || interviewer_id != existing.interviewer_id;
        if new_bounds.is_some() || axis_changed {
            let (start, end) =
                new_bounds.unwrap_or((existing.from_time_utc, existing.to_time_utc));
            conflict::assert_no_overlap(&mut tx, Axis::Candidate, candidate_id, start, end, Some(id))
                .await?;
            conflict::assert_no_overlap(
                &mut tx,
                Axis::Interviewer,
                interviewer_id,
                start,
                end,
                Some(id),
            )
            .await?;
        }

        // A move to another candidate joins the end of the destination's
        // round sequence; keeping the old number could duplicate one the
        // destination already holds.
        let moved_round = if candidate_changed {
            Some(rounds::next_round_number(&mut tx, candidate_id).await?)
        } else {
            None
        };

        let updated = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews SET
                candidate_id = COALESCE($1, candidate_id),
                interviewer_id = COALESCE($2, interviewer_id),
                scheduled_by_id = COALESCE($3, scheduled_by_id),
                interview_date = COALESCE($4, interview_date),
                from_time_local = COALESCE($5, from_time_local),
                duration_minutes = COALESCE($6, duration_minutes),
                event_timezone = COALESCE($7, event_timezone),
                from_time_utc = COALESCE($8, from_time_utc),
                to_time_utc = COALESCE($9, to_time_utc),
                round_number = COALESCE($11, round_number),
                updated_at = NOW()
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(patch.candidate_id)
        .bind(patch.interviewer_id)
        .bind(patch.scheduled_by_id)
        .bind(patch.interview_date)
        .bind(patch.from_time)
        .bind(patch.duration_minutes)
        .bind(&patch.event_timezone)
        .bind(new_bounds.map(|(from, _)| from))
        .bind(new_bounds.map(|(_, to)| to))
        .bind(id)
        .bind(moved_round)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::db("update_interview", e))?;

        // The source candidate's remaining rounds close back up to 1..N
        // inside the same transaction.
        if candidate_changed {
            rounds::renumber_rounds(&mut tx, existing.candidate_id).await?;
        }

        audit::log_action(
            &mut tx,
            ctx,
            AuditAction::Update,
            id,
            serde_json::to_value(&existing).ok(),
            serde_json::to_value(&updated).ok(),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::db("commit_update_interview", e))?;

        log_schedule_event("interview_updated", &updated, ctx);
        Ok(updated)
    }

    /// Records the outcome. No lifecycle gate is applied: an interview may
    /// be finalized and later edited again.
    pub async fn finalize_interview(
        &self,
        id: i32,
        request: FinalizeInterviewRequest,
        ctx: &AuditContext,
    ) -> Result<Interview, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::db("begin_finalize_interview", e))?;

        let existing = load_active_interview(&mut tx, id).await?;

        let finalized = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews SET
                result = COALESCE($1, result),
                recruiter_notes = COALESCE($2, recruiter_notes),
                interviewer_feedback = COALESCE($3, interviewer_feedback),
                meeting_url = COALESCE($4, meeting_url),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&request.result)
        .bind(&request.recruiter_notes)
        .bind(&request.interviewer_feedback)
        .bind(&request.meeting_url)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::db("finalize_interview", e))?;

        audit::log_action(
            &mut tx,
            ctx,
            AuditAction::Update,
            id,
            serde_json::to_value(&existing).ok(),
            serde_json::to_value(&finalized).ok(),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::db("commit_finalize_interview", e))?;

        log_schedule_event("interview_finalized", &finalized, ctx);
        Ok(finalized)
    }

    /// Soft delete: the row stays behind for the retention sweep, and the
    /// candidate's remaining rounds are renumbered back to a contiguous
    /// sequence inside the same transaction.
    pub async fn delete_interview(
        &self,
        id: i32,
        ctx: &AuditContext,
    ) -> Result<Interview, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::db("begin_delete_interview", e))?;

        let existing = load_active_interview(&mut tx, id).await?;

        let deleted = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET is_active = FALSE, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::db("delete_interview", e))?;

        rounds::renumber_rounds(&mut tx, existing.candidate_id).await?;

        audit::log_action(
            &mut tx,
            ctx,
            AuditAction::Delete,
            id,
            serde_json::to_value(&existing).ok(),
            None,
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::db("commit_delete_interview", e))?;

        log_schedule_event("interview_deleted", &deleted, ctx);
        Ok(deleted)
    }
}

async fn verify_candidate_schedulable(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: i32,
) -> Result<(), DomainError> {
    let candidate = sqlx::query_as::<_, CandidateStatus>(
        "SELECT id, is_active, deleted_at FROM candidates WHERE id = $1",
    )
    .bind(candidate_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| DomainError::db("candidate_lookup", e))?
    .ok_or(DomainError::CandidateNotFound(candidate_id))?;

    if !candidate.is_schedulable() {
        return Err(DomainError::CandidateInactive(candidate_id));
    }

    Ok(())
}

async fn load_active_interview(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
) -> Result<Interview, DomainError> {
    sqlx::query_as::<_, Interview>(
        "SELECT * FROM interviews
         WHERE id = $1 AND is_active = TRUE AND deleted_at IS NULL
         FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| DomainError::db("load_interview", e))?
    .ok_or(DomainError::InterviewNotFound(id))
}

/// Shared body of create and schedule-next-round: normalize the local time,
/// check both axes, assign the next round number, insert, audit.
async fn insert_scheduled_interview(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: i32,
    request: &ScheduleInterviewRequest,
    ctx: &AuditContext,
) -> Result<Interview, DomainError> {
    let from_utc = timezone::build_utc_instant(
        request.interview_date,
        request.from_time,
        &request.event_timezone,
    )?;
    let to_utc = from_utc + Duration::minutes(request.duration_minutes as i64);

    conflict::assert_no_overlap(tx, Axis::Candidate, candidate_id, from_utc, to_utc, None).await?;
    conflict::assert_no_overlap(
        tx,
        Axis::Interviewer,
        request.interviewer_id,
        from_utc,
        to_utc,
        None,
    )
    .await?;

    let round_number = rounds::next_round_number(tx, candidate_id).await?;

    let interview = sqlx::query_as::<_, Interview>(
        r#"
        INSERT INTO interviews
            (candidate_id, interviewer_id, scheduled_by_id, round_number,
             interview_date, from_time_local, duration_minutes, event_timezone,
             from_time_utc, to_time_utc)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(request.interviewer_id)
    .bind(request.scheduled_by_id)
    .bind(round_number)
    .bind(request.interview_date)
    .bind(request.from_time)
    .bind(request.duration_minutes)
    .bind(&request.event_timezone)
    .bind(from_utc)
    .bind(to_utc)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| DomainError::db("insert_interview", e))?;

    audit::log_action(
        tx,
        ctx,
        AuditAction::Create,
        interview.id,
        None,
        serde_json::to_value(&interview).ok(),
    )
    .await?;

    Ok(interview)
}

fn log_schedule_event(event: &str, interview: &Interview, ctx: &AuditContext) {
    let mut metadata = HashMap::new();
    metadata.insert(
        "interview_id".to_string(),
        serde_json::Value::Number(interview.id.into()),
    );
    metadata.insert(
        "candidate_id".to_string(),
        serde_json::Value::Number(interview.candidate_id.into()),
    );
    metadata.insert(
        "round_number".to_string(),
        serde_json::Value::Number(interview.round_number.into()),
    );
    LOGGER.log_business_event(event, ctx.user_id, metadata);
}
