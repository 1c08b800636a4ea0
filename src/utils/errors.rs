use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::utils::logger::LOGGER;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid time specification: {0}")]
    InvalidTimeSpecification(String),
    #[error("interview_date, from_time and event_timezone must be supplied together when rescheduling")]
    InvalidTimeUpdate,
    #[error("candidate {0} not found")]
    CandidateNotFound(i32),
    #[error("interview {0} not found")]
    InterviewNotFound(i32),
    #[error("candidate {0} is not active")]
    CandidateInactive(i32),
    #[error("candidate {0} has no prior interviews to continue from")]
    NoPriorInterview(i32),
    #[error("candidate {candidate_id} already has an interview overlapping the requested slot")]
    CandidateConflict { candidate_id: i32 },
    #[error("interviewer {interviewer_id} is already booked for an overlapping slot")]
    InterviewerConflict { interviewer_id: i32 },
    #[error("validation failed")]
    Validation(HashMap<String, Vec<String>>),
    #[error("database failure during {operation}")]
    Database {
        operation: String,
        #[source]
        source: sqlx::Error,
    },
}

impl DomainError {
    /// Wraps a driver-level failure, logging it at the wrap site so raw
    /// driver internals never travel up to the HTTP layer.
    pub fn db(operation: &str, source: sqlx::Error) -> Self {
        let mut context = HashMap::new();
        context.insert(
            "operation".to_string(),
            serde_json::Value::String(operation.to_string()),
        );
        LOGGER.log_error(&source.to_string(), context);

        DomainError::Database {
            operation: operation.to_string(),
            source,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::InvalidTimeSpecification(_) => "INVALID_TIME_SPECIFICATION",
            DomainError::InvalidTimeUpdate => "INVALID_TIME_UPDATE",
            DomainError::CandidateNotFound(_) => "CANDIDATE_NOT_FOUND",
            DomainError::InterviewNotFound(_) => "INTERVIEW_NOT_FOUND",
            DomainError::CandidateInactive(_) => "CANDIDATE_INACTIVE",
            DomainError::NoPriorInterview(_) => "NO_PRIOR_INTERVIEW",
            DomainError::CandidateConflict { .. } => "CANDIDATE_CONFLICT",
            DomainError::InterviewerConflict { .. } => "INTERVIEWER_CONFLICT",
            DomainError::Validation(_) => "VALIDATION_ERROR",
            DomainError::Database { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            DomainError::InvalidTimeSpecification(_)
            | DomainError::InvalidTimeUpdate
            | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::CandidateNotFound(_) | DomainError::InterviewNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DomainError::CandidateConflict { .. } | DomainError::InterviewerConflict { .. } => {
                StatusCode::CONFLICT
            }
            DomainError::CandidateInactive(_) | DomainError::NoPriorInterview(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DomainError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let (message, details) = match &self {
            DomainError::Validation(errors) => {
                ("Validation failed".to_string(), Some(errors.clone()))
            }
            // Clients get the failing operation name only; internals stay in the logs.
            DomainError::Database { operation, .. } => {
                (format!("Internal error during {}", operation), None)
            }
            other => (other.to_string(), None),
        };

        let error_response = ErrorResponse {
            error: self.kind().to_string(),
            message,
            details,
            timestamp: Utc::now(),
        };

        (self.status(), Json(error_response)).into_response()
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut error_map = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("Invalid value for field '{}'", field))
                })
                .collect();
            error_map.insert(field.to_string(), messages);
        }

        DomainError::Validation(error_map)
    }
}
