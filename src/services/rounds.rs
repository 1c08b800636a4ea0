use sqlx::{Postgres, Row, Transaction};

use crate::utils::errors::DomainError;

/// Next round number for a candidate: active count + 1. Numbers freed by a
/// deletion are never handed out here; `renumber_rounds` closes the gap
/// instead.
pub async fn next_round_number(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: i32,
) -> Result<i32, DomainError> {
    let row = sqlx::query(
        "SELECT COUNT(*)::int AS active_rounds FROM interviews
         WHERE candidate_id = $1 AND is_active = TRUE AND deleted_at IS NULL",
    )
    .bind(candidate_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| DomainError::db("next_round_number", e))?;

    let active_rounds: i32 = row.get("active_rounds");
    Ok(active_rounds + 1)
}

/// Whether the candidate has any recorded interview at all, soft-deleted
/// included. Gate for scheduling a follow-up round.
pub async fn has_prior_interviews(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: i32,
) -> Result<bool, DomainError> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM interviews WHERE candidate_id = $1) AS has_any")
        .bind(candidate_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| DomainError::db("has_prior_interviews", e))?;

    Ok(row.get("has_any"))
}

/// Computes the round-number rewrites needed to make `current` (ordered
/// `(id, round_number)` pairs) contiguous `1..N`. Returns only the pairs
/// whose number changes, so a second pass with no intervening change is a
/// no-op.
pub fn contiguous_targets(current: &[(i32, i32)]) -> Vec<(i32, i32)> {
    current
        .iter()
        .enumerate()
        .filter_map(|(index, &(id, round))| {
            let target = index as i32 + 1;
            (round != target).then_some((id, target))
        })
        .collect()
}

/// Re-sequences a candidate's remaining active interviews into contiguous
/// `1..N` after a deletion, preserving their existing order (round number,
/// then UTC start, then id). Idempotent.
pub async fn renumber_rounds(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: i32,
) -> Result<(), DomainError> {
    let rows = sqlx::query(
        "SELECT id, round_number FROM interviews
         WHERE candidate_id = $1 AND is_active = TRUE AND deleted_at IS NULL
         ORDER BY round_number ASC, from_time_utc ASC, id ASC
         FOR UPDATE",
    )
    .bind(candidate_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| DomainError::db("renumber_rounds_scan", e))?;

    let current: Vec<(i32, i32)> = rows
        .iter()
        .map(|row| (row.get("id"), row.get("round_number")))
        .collect();

    for (id, target) in contiguous_targets(&current) {
        sqlx::query("UPDATE interviews SET round_number = $1, updated_at = NOW() WHERE id = $2")
            .bind(target)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| DomainError::db("renumber_rounds_write", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleting_a_middle_round_closes_the_gap() {
        // Rounds 1, 2, 3 with round 2 deleted: the former round 3 becomes 2.
        let remaining = [(10, 1), (30, 3)];
        assert_eq!(contiguous_targets(&remaining), vec![(30, 2)]);
    }

    #[test]
    fn contiguous_sequence_needs_no_rewrites() {
        let remaining = [(10, 1), (20, 2), (30, 3)];
        assert!(contiguous_targets(&remaining).is_empty());
    }

    #[test]
    fn renumbering_is_idempotent() {
        let remaining = [(10, 1), (30, 3), (50, 7)];
        let first_pass = contiguous_targets(&remaining);
        assert_eq!(first_pass, vec![(30, 2), (50, 3)]);

        // Apply the rewrites, run again: nothing left to change.
        let after: Vec<(i32, i32)> = [(10, 1), (30, 2), (50, 3)].to_vec();
        assert!(contiguous_targets(&after).is_empty());
    }

    #[test]
    fn duplicate_round_numbers_are_resequenced() {
        // A row that arrived carrying a number the sequence already holds
        // gets pushed to the next slot.
        let remaining = [(10, 1), (20, 2), (30, 2)];
        assert_eq!(contiguous_targets(&remaining), vec![(30, 3)]);
    }

    #[test]
    fn source_sequence_closes_after_a_round_moves_away() {
        // Rounds {1,2,3} with round 2 moved to another candidate: the
        // stay-behind rounds become {1,2}.
        let remaining = [(10, 1), (30, 3)];
        assert_eq!(contiguous_targets(&remaining), vec![(30, 2)]);
    }

    #[test]
    fn deleting_the_first_round_shifts_everything_down() {
        let remaining = [(20, 2), (30, 3)];
        assert_eq!(contiguous_targets(&remaining), vec![(20, 1), (30, 2)]);
    }

    #[test]
    fn empty_schedule_needs_no_rewrites() {
        assert!(contiguous_targets(&[]).is_empty());
    }
}
