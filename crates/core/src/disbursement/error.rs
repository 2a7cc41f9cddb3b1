//! Disbursement error types.

use thiserror::Error;
use uuid::Uuid;

use crate::disbursement::types::DisbursementStatus;

/// Errors that can occur during disbursement operations.
#[derive(Debug, Error)]
pub enum DisbursementError {
    /// Attempted a handoff step out of order.
    #[error("Disbursement is {current}; expected {expected} for this step")]
    InvalidDisbursementTransition {
        /// The disbursement's current status.
        current: DisbursementStatus,
        /// The status the step requires.
        expected: DisbursementStatus,
    },

    /// The aid request has not passed all three review stages.
    #[error("Aid request {0} is not fully approved")]
    RequestNotFullyApproved(Uuid),

    /// A disbursement already exists for the aid request.
    #[error("Aid request {0} already has a disbursement")]
    DuplicateDisbursement(Uuid),

    /// The disbursement still has liquidations that are not terminal.
    #[error("Disbursement has {count} liquidation(s) that are not yet approved or rejected")]
    HasActiveLiquidations {
        /// Number of non-terminal liquidations.
        count: usize,
    },

    /// Disbursement not found.
    #[error("Disbursement {0} not found")]
    NotFound(Uuid),

    /// Aid request not found.
    #[error("Aid request {0} not found")]
    AidRequestNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl DisbursementError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDisbursementTransition { .. } => 409,
            Self::RequestNotFullyApproved(_) | Self::HasActiveLiquidations { .. } => 422,
            Self::DuplicateDisbursement(_) => 409,
            Self::NotFound(_) | Self::AidRequestNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDisbursementTransition { .. } => "INVALID_DISBURSEMENT_TRANSITION",
            Self::RequestNotFullyApproved(_) => "REQUEST_NOT_FULLY_APPROVED",
            Self::DuplicateDisbursement(_) => "DUPLICATE_DISBURSEMENT",
            Self::HasActiveLiquidations { .. } => "HAS_ACTIVE_LIQUIDATIONS",
            Self::NotFound(_) => "DISBURSEMENT_NOT_FOUND",
            Self::AidRequestNotFound(_) => "AID_REQUEST_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = DisbursementError::InvalidDisbursementTransition {
            current: DisbursementStatus::Pending,
            expected: DisbursementStatus::CaseworkerReceived,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_DISBURSEMENT_TRANSITION");
        assert!(err.to_string().contains("pending"));
        assert!(err.to_string().contains("caseworker_received"));
    }

    #[test]
    fn test_not_fully_approved_error() {
        let err = DisbursementError::RequestNotFullyApproved(Uuid::nil());
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "REQUEST_NOT_FULLY_APPROVED");
    }

    #[test]
    fn test_duplicate_disbursement_error() {
        let err = DisbursementError::DuplicateDisbursement(Uuid::nil());
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_DISBURSEMENT");
    }

    #[test]
    fn test_has_active_liquidations_error() {
        let err = DisbursementError::HasActiveLiquidations { count: 2 };
        assert_eq!(err.status_code(), 422);
        assert!(err.to_string().contains('2'));
    }
}
