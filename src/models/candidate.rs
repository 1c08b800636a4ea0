use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The slice of the candidate record this core reads; candidates are owned
/// by the general CRUD layer elsewhere.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateStatus {
    pub id: i32,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CandidateStatus {
    pub fn is_schedulable(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}
