//! Aid request error types.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::aid_request::types::{Period, ReviewStage};
use crate::role::ActorRole;

/// Errors that can occur during aid request operations.
#[derive(Debug, Error)]
pub enum AidRequestError {
    /// The acting role does not own the request's current stage.
    #[error("Request is at stage {stage}; a {role} cannot decide it")]
    InvalidStageTransition {
        /// The request's current stage cursor.
        stage: ReviewStage,
        /// The role that attempted the decision.
        role: ActorRole,
    },

    /// The current stage has already been decided (or the caller lost a race).
    #[error("Stage {stage} has already been decided")]
    AlreadyDecided {
        /// The stage that was already decided.
        stage: ReviewStage,
        /// Who decided it, when known.
        decided_by: Option<Uuid>,
        /// When it was decided, when known.
        decided_at: Option<DateTime<Utc>>,
    },

    /// A non-rejected cost-of-living request already exists for this period.
    #[error("A request for period {period} already exists for this beneficiary")]
    DuplicatePeriodRequest {
        /// The conflicting period.
        period: Period,
    },

    /// Cost-of-living requests must carry a period.
    #[error("Cost-of-living requests require a (month, year) period")]
    PeriodRequired,

    /// Only cost-of-living requests may carry a period.
    #[error("Only cost-of-living requests may carry a period")]
    PeriodNotAllowed,

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Requested amount must be positive.
    #[error("Requested amount must be greater than zero")]
    AmountNotPositive,

    /// Aid request not found.
    #[error("Aid request {0} not found")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AidRequestError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidStageTransition { .. } => 403,
            Self::AlreadyDecided { .. } | Self::DuplicatePeriodRequest { .. } => 409,
            Self::PeriodRequired
            | Self::PeriodNotAllowed
            | Self::RejectionReasonRequired
            | Self::AmountNotPositive => 400,
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStageTransition { .. } => "INVALID_STAGE_TRANSITION",
            Self::AlreadyDecided { .. } => "ALREADY_DECIDED",
            Self::DuplicatePeriodRequest { .. } => "DUPLICATE_PERIOD_REQUEST",
            Self::PeriodRequired => "PERIOD_REQUIRED",
            Self::PeriodNotAllowed => "PERIOD_NOT_ALLOWED",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::AmountNotPositive => "AMOUNT_NOT_POSITIVE",
            Self::NotFound(_) => "AID_REQUEST_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_stage_transition_error() {
        let err = AidRequestError::InvalidStageTransition {
            stage: ReviewStage::Finance,
            role: ActorRole::Caseworker,
        };
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "INVALID_STAGE_TRANSITION");
        assert!(err.to_string().contains("finance"));
        assert!(err.to_string().contains("caseworker"));
    }

    #[test]
    fn test_already_decided_error() {
        let err = AidRequestError::AlreadyDecided {
            stage: ReviewStage::Caseworker,
            decided_by: Some(Uuid::nil()),
            decided_at: None,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "ALREADY_DECIDED");
    }

    #[test]
    fn test_duplicate_period_error() {
        let err = AidRequestError::DuplicatePeriodRequest {
            period: Period::new(2, 2026).unwrap(),
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_PERIOD_REQUEST");
        assert!(err.to_string().contains("2026-02"));
    }

    #[test]
    fn test_not_found_error() {
        let err = AidRequestError::NotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "AID_REQUEST_NOT_FOUND");
    }

    #[test]
    fn test_validation_errors_are_400() {
        assert_eq!(AidRequestError::PeriodRequired.status_code(), 400);
        assert_eq!(AidRequestError::PeriodNotAllowed.status_code(), 400);
        assert_eq!(AidRequestError::RejectionReasonRequired.status_code(), 400);
        assert_eq!(AidRequestError::AmountNotPositive.status_code(), 400);
    }
}
