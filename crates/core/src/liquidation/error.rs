//! Liquidation error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::disbursement::types::DisbursementStatus;
use crate::liquidation::types::{ApprovalLevel, LiquidationStatus};

/// Errors that can occur during liquidation operations.
#[derive(Debug, Error)]
pub enum LiquidationError {
    /// Receipt aggregate would exceed what the disbursement has left.
    #[error("Receipts would total {attempted}, but only {available} remains to liquidate")]
    OverLiquidation {
        /// The aggregate the attachment would reach.
        attempted: Decimal,
        /// The exact amount still available to claim.
        available: Decimal,
    },

    /// The liquidation is already approved or rejected.
    #[error("Liquidation is already {status}; no further actions are accepted")]
    LiquidationAlreadyTerminal {
        /// The terminal status.
        status: LiquidationStatus,
    },

    /// The decision level does not match the liquidation's status.
    #[error("Liquidation is {status}; a {level}-level decision is not acceptable")]
    ApprovalLevelMismatch {
        /// The liquidation's current status.
        status: LiquidationStatus,
        /// The level that attempted the decision.
        level: ApprovalLevel,
    },

    /// Submission requires the receipts to fully cover the claim.
    #[error("Liquidation is {status}; only complete liquidations can be submitted")]
    NotReadyForSubmission {
        /// The liquidation's current status.
        status: LiquidationStatus,
    },

    /// Receipts cannot change once submitted for approval.
    #[error("Liquidation is {status}; receipts are sealed after submission")]
    ReceiptsSealed {
        /// The liquidation's current status.
        status: LiquidationStatus,
    },

    /// The disbursement has not reached the beneficiary yet.
    #[error("Disbursement is {status}; liquidation starts after the beneficiary receives funds")]
    NotLiquidatable {
        /// The disbursement's current status.
        status: DisbursementStatus,
    },

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Receipt amount must be positive.
    #[error("Receipt amount must be greater than zero")]
    ReceiptAmountNotPositive,

    /// Claimed amount must be positive.
    #[error("Claimed amount must be greater than zero")]
    ClaimAmountNotPositive,

    /// Receipt not found on this liquidation.
    #[error("Receipt {0} not found on this liquidation")]
    ReceiptNotFound(Uuid),

    /// Liquidation not found.
    #[error("Liquidation {0} not found")]
    NotFound(Uuid),

    /// Parent disbursement not found.
    #[error("Disbursement {0} not found")]
    DisbursementNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LiquidationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::OverLiquidation { .. }
            | Self::NotReadyForSubmission { .. }
            | Self::ReceiptsSealed { .. }
            | Self::NotLiquidatable { .. } => 422,
            Self::LiquidationAlreadyTerminal { .. } | Self::ApprovalLevelMismatch { .. } => 409,
            Self::RejectionReasonRequired
            | Self::ReceiptAmountNotPositive
            | Self::ClaimAmountNotPositive => 400,
            Self::ReceiptNotFound(_) | Self::NotFound(_) | Self::DisbursementNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OverLiquidation { .. } => "OVER_LIQUIDATION",
            Self::LiquidationAlreadyTerminal { .. } => "LIQUIDATION_ALREADY_TERMINAL",
            Self::ApprovalLevelMismatch { .. } => "APPROVAL_LEVEL_MISMATCH",
            Self::NotReadyForSubmission { .. } => "NOT_READY_FOR_SUBMISSION",
            Self::ReceiptsSealed { .. } => "RECEIPTS_SEALED",
            Self::NotLiquidatable { .. } => "NOT_LIQUIDATABLE",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::ReceiptAmountNotPositive => "RECEIPT_AMOUNT_NOT_POSITIVE",
            Self::ClaimAmountNotPositive => "CLAIM_AMOUNT_NOT_POSITIVE",
            Self::ReceiptNotFound(_) => "RECEIPT_NOT_FOUND",
            Self::NotFound(_) => "LIQUIDATION_NOT_FOUND",
            Self::DisbursementNotFound(_) => "DISBURSEMENT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_over_liquidation_reports_available() {
        let err = LiquidationError::OverLiquidation {
            attempted: dec!(1100),
            available: dec!(400),
        };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "OVER_LIQUIDATION");
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn test_terminal_error_is_conflict() {
        let err = LiquidationError::LiquidationAlreadyTerminal {
            status: LiquidationStatus::Rejected,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "LIQUIDATION_ALREADY_TERMINAL");
        assert!(err.to_string().contains("rejected"));
    }

    #[test]
    fn test_level_mismatch_error() {
        let err = LiquidationError::ApprovalLevelMismatch {
            status: LiquidationStatus::PendingFinanceApproval,
            level: ApprovalLevel::Director,
        };
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("pending_finance_approval"));
        assert!(err.to_string().contains("director"));
    }

    #[test]
    fn test_not_found_errors() {
        assert_eq!(LiquidationError::NotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(
            LiquidationError::ReceiptNotFound(Uuid::nil()).status_code(),
            404
        );
    }
}
