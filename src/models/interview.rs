use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: i32,
    pub candidate_id: i32,
    pub interviewer_id: i32,
    pub scheduled_by_id: i32,
    pub round_number: i32,
    pub interview_date: NaiveDate,
    pub from_time_local: NaiveTime,
    pub duration_minutes: i32,
    pub event_timezone: String,
    pub from_time_utc: DateTime<Utc>,
    pub to_time_utc: DateTime<Utc>,
    pub result: String,
    pub recruiter_notes: Option<String>,
    pub interviewer_feedback: Option<String>,
    pub meeting_url: Option<String>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleInterviewRequest {
    pub interview_date: NaiveDate,
    pub from_time: NaiveTime,
    #[validate(range(min = 1, max = 720))]
    pub duration_minutes: i32,
    #[validate(length(min = 1))]
    pub event_timezone: String,
    pub interviewer_id: i32,
    pub scheduled_by_id: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInterviewRequest {
    pub candidate_id: Option<i32>,
    pub interview_date: Option<NaiveDate>,
    pub from_time: Option<NaiveTime>,
    #[validate(range(min = 1, max = 720))]
    pub duration_minutes: Option<i32>,
    pub event_timezone: Option<String>,
    pub interviewer_id: Option<i32>,
    pub scheduled_by_id: Option<i32>,
}

impl UpdateInterviewRequest {
    /// True when the patch touches any field that feeds the UTC bounds.
    pub fn touches_schedule(&self) -> bool {
        self.interview_date.is_some()
            || self.from_time.is_some()
            || self.event_timezone.is_some()
            || self.duration_minutes.is_some()
    }

    /// A rescheduling patch must carry date, start time and timezone together.
    /// Duration alone may fall back to the stored value.
    pub fn has_complete_time_fields(&self) -> bool {
        self.interview_date.is_some()
            && self.from_time.is_some()
            && self.event_timezone.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct FinalizeInterviewRequest {
    pub result: Option<String>,
    pub recruiter_notes: Option<String>,
    pub interviewer_feedback: Option<String>,
    pub meeting_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InterviewResponse {
    pub id: i32,
    pub candidate_id: i32,
    pub interviewer_id: i32,
    pub scheduled_by_id: i32,
    pub round_number: i32,
    pub interview_date: NaiveDate,
    pub from_time_local: NaiveTime,
    pub duration_minutes: i32,
    pub event_timezone: String,
    pub from_time_utc: DateTime<Utc>,
    pub to_time_utc: DateTime<Utc>,
    pub result: String,
    pub recruiter_notes: Option<String>,
    pub interviewer_feedback: Option<String>,
    pub meeting_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Interview> for InterviewResponse {
    fn from(interview: Interview) -> Self {
        Self {
            id: interview.id,
            candidate_id: interview.candidate_id,
            interviewer_id: interview.interviewer_id,
            scheduled_by_id: interview.scheduled_by_id,
            round_number: interview.round_number,
            interview_date: interview.interview_date,
            from_time_local: interview.from_time_local,
            duration_minutes: interview.duration_minutes,
            event_timezone: interview.event_timezone,
            from_time_utc: interview.from_time_utc,
            to_time_utc: interview.to_time_utc,
            // Stored casing is free-form; responses always use display casing.
            result: display_result(&interview.result),
            recruiter_notes: interview.recruiter_notes,
            interviewer_feedback: interview.interviewer_feedback,
            meeting_url: interview.meeting_url,
            is_active: interview.is_active,
            created_at: interview.created_at,
            updated_at: interview.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteInterviewResponse {
    pub id: i32,
    pub deleted_at: DateTime<Utc>,
}

/// Read-time normalization of the free-text result column: first letter
/// uppercase, remainder lowercase. Stored values are left as written.
pub fn display_result(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_result_capitalizes_first_letter_only() {
        assert_eq!(display_result("selected"), "Selected");
        assert_eq!(display_result("REJECTED"), "Rejected");
        assert_eq!(display_result("pEnDiNg"), "Pending");
    }

    #[test]
    fn display_result_handles_empty_string() {
        assert_eq!(display_result(""), "");
    }

    #[test]
    fn partial_time_patch_is_incomplete() {
        let patch = UpdateInterviewRequest {
            from_time: Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(patch.touches_schedule());
        assert!(!patch.has_complete_time_fields());
    }

    #[test]
    fn duration_only_patch_still_touches_schedule() {
        let patch = UpdateInterviewRequest {
            duration_minutes: Some(45),
            ..Default::default()
        };
        assert!(patch.touches_schedule());
        assert!(!patch.has_complete_time_fields());
    }

    #[test]
    fn full_time_patch_is_complete_without_duration() {
        let patch = UpdateInterviewRequest {
            interview_date: NaiveDate::from_ymd_opt(2025, 1, 10),
            from_time: NaiveTime::from_hms_opt(10, 0, 0),
            event_timezone: Some("Asia/Kolkata".to_string()),
            ..Default::default()
        };
        assert!(patch.touches_schedule());
        assert!(patch.has_complete_time_fields());
    }

    #[test]
    fn outcome_only_patch_does_not_touch_schedule() {
        let patch = UpdateInterviewRequest {
            interviewer_id: Some(7),
            ..Default::default()
        };
        assert!(!patch.touches_schedule());
    }
}
