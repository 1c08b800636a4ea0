use chrono::{DateTime, Utc};
use sqlx::{Postgres, Row, Transaction};

use crate::utils::errors::DomainError;

/// The dimension along which double-booking is checked. Candidate and
/// interviewer schedules are validated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Candidate,
    Interviewer,
}

impl Axis {
    fn column(&self) -> &'static str {
        match self {
            Axis::Candidate => "candidate_id",
            Axis::Interviewer => "interviewer_id",
        }
    }

    // Advisory lock class, so candidate 5 and interviewer 5 lock independently.
    fn lock_class(&self) -> i32 {
        match self {
            Axis::Candidate => 1,
            Axis::Interviewer => 2,
        }
    }

    fn conflict(&self, entity_id: i32) -> DomainError {
        match self {
            Axis::Candidate => DomainError::CandidateConflict {
                candidate_id: entity_id,
            },
            Axis::Interviewer => DomainError::InterviewerConflict {
                interviewer_id: entity_id,
            },
        }
    }
}

/// Half-open interval intersection: `[a_start, a_end)` against
/// `[b_start, b_end)`. Intervals that merely touch at an endpoint do not
/// overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Validates a proposed `[start, end)` slot against every active interview
/// for `entity_id` on the given axis, inside the caller's transaction.
///
/// A per-entity advisory transaction lock is taken first so two concurrent
/// requests for the same candidate or interviewer serialize on the check;
/// without it the check-then-insert sequence races (see DESIGN.md).
pub async fn assert_no_overlap(
    tx: &mut Transaction<'_, Postgres>,
    axis: Axis,
    entity_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_id: Option<i32>,
) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(axis.lock_class())
        .bind(entity_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::db("conflict_lock", e))?;

    let query = format!(
        "SELECT id, from_time_utc, to_time_utc FROM interviews
         WHERE {} = $1 AND is_active = TRUE AND deleted_at IS NULL
           AND ($2::int IS NULL OR id <> $2)",
        axis.column()
    );

    let rows = sqlx::query(&query)
        .bind(entity_id)
        .bind(exclude_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| DomainError::db("conflict_scan", e))?;

    for row in rows {
        let existing_start: DateTime<Utc> = row.get("from_time_utc");
        let existing_end: DateTime<Utc> = row.get("to_time_utc");

        if intervals_overlap(existing_start, existing_end, start, end) {
            return Err(axis.conflict(entity_id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn partial_overlap_is_detected() {
        assert!(intervals_overlap(at(10, 0), at(10, 30), at(10, 15), at(10, 45)));
    }

    #[test]
    fn containment_is_detected() {
        assert!(intervals_overlap(at(10, 0), at(11, 0), at(10, 15), at(10, 30)));
        assert!(intervals_overlap(at(10, 15), at(10, 30), at(10, 0), at(11, 0)));
    }

    #[test]
    fn identical_intervals_overlap() {
        assert!(intervals_overlap(at(10, 0), at(10, 30), at(10, 0), at(10, 30)));
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        assert!(!intervals_overlap(at(10, 0), at(10, 30), at(10, 30), at(11, 0)));
        assert!(!intervals_overlap(at(10, 30), at(11, 0), at(10, 0), at(10, 30)));
    }

    #[test]
    fn disjoint_intervals_do_not_overlap() {
        assert!(!intervals_overlap(at(9, 0), at(9, 30), at(10, 0), at(10, 30)));
    }

    #[test]
    fn overlap_is_symmetric() {
        assert_eq!(
            intervals_overlap(at(10, 0), at(10, 30), at(10, 15), at(10, 45)),
            intervals_overlap(at(10, 15), at(10, 45), at(10, 0), at(10, 30)),
        );
    }
}
