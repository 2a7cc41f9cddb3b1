//! Liquidation domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use almoner_shared::types::Money;

use crate::aid_request::types::FundCategory;
use crate::role::ActorRole;

/// Approval level in the liquidation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalLevel {
    /// First level.
    Caseworker,
    /// Second level.
    Finance,
    /// Final level.
    Director,
}

impl ApprovalLevel {
    /// Returns the string representation of the level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caseworker => "caseworker",
            Self::Finance => "finance",
            Self::Director => "director",
        }
    }

    /// Parses a level from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "caseworker" => Some(Self::Caseworker),
            "finance" => Some(Self::Finance),
            "director" => Some(Self::Director),
            _ => None,
        }
    }

    /// The next level in the chain, if any.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Caseworker => Some(Self::Finance),
            Self::Finance => Some(Self::Director),
            Self::Director => None,
        }
    }

    /// The pending status awaiting this level's decision.
    #[must_use]
    pub fn pending_status(&self) -> LiquidationStatus {
        match self {
            Self::Caseworker => LiquidationStatus::PendingCaseworkerApproval,
            Self::Finance => LiquidationStatus::PendingFinanceApproval,
            Self::Director => LiquidationStatus::PendingDirectorApproval,
        }
    }

    /// The actor role that decides at this level.
    #[must_use]
    pub fn required_role(&self) -> ActorRole {
        match self {
            Self::Caseworker => ActorRole::Caseworker,
            Self::Finance => ActorRole::Finance,
            Self::Director => ActorRole::Director,
        }
    }
}

impl fmt::Display for ApprovalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a liquidation from creation to terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidationStatus {
    /// Created; no receipts yet.
    Pending,
    /// Receipts attached but the claimed amount is not fully covered.
    InProgress,
    /// Receipts fully cover the claimed amount; ready for submission.
    Complete,
    /// Awaiting the caseworker decision.
    PendingCaseworkerApproval,
    /// Awaiting the finance decision.
    PendingFinanceApproval,
    /// Awaiting the director decision.
    PendingDirectorApproval,
    /// Approved at all three levels; rolled into the ledger.
    Approved,
    /// Rejected at some level; terminal.
    Rejected,
}

impl LiquidationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::PendingCaseworkerApproval => "pending_caseworker_approval",
            Self::PendingFinanceApproval => "pending_finance_approval",
            Self::PendingDirectorApproval => "pending_director_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "complete" => Some(Self::Complete),
            "pending_caseworker_approval" => Some(Self::PendingCaseworkerApproval),
            "pending_finance_approval" => Some(Self::PendingFinanceApproval),
            "pending_director_approval" => Some(Self::PendingDirectorApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true for the terminal statuses.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// The approval level this status is waiting on, if any.
    #[must_use]
    pub fn awaiting_level(&self) -> Option<ApprovalLevel> {
        match self {
            Self::PendingCaseworkerApproval => Some(ApprovalLevel::Caseworker),
            Self::PendingFinanceApproval => Some(ApprovalLevel::Finance),
            Self::PendingDirectorApproval => Some(ApprovalLevel::Director),
            _ => None,
        }
    }

    /// Returns true while receipts may still be attached.
    #[must_use]
    pub fn accepts_receipts(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl fmt::Display for LiquidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verification state of a single receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Not yet examined by a reviewer.
    #[default]
    Pending,
    /// Examined and accepted.
    Verified,
    /// Examined and flagged for follow-up.
    Questioned,
}

impl VerificationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Questioned => "questioned",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "questioned" => Some(Self::Questioned),
            _ => None,
        }
    }
}

/// A single piece of expense evidence attached to a liquidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning liquidation.
    pub liquidation_id: Uuid,
    /// Receipt amount; immutable once verification begins.
    pub amount: Money,
    /// Vendor receipt number.
    pub receipt_number: String,
    /// Date on the receipt.
    pub receipt_date: NaiveDate,
    /// Free-text description of the expense.
    pub description: Option<String>,
    /// Opaque reference into the external file store.
    pub file_ref: Option<String>,
    /// Reviewer verification state.
    pub verification_status: VerificationStatus,
    /// Reviewer notes on verification.
    pub verification_notes: Option<String>,
    /// When the receipt was attached.
    pub created_at: DateTime<Utc>,
}

/// Decision record for one approval level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelReview {
    /// Approver who decided at this level.
    pub approver: Option<Uuid>,
    /// When the decision was made.
    pub decided_at: Option<DateTime<Utc>>,
    /// Approver notes.
    pub notes: Option<String>,
}

/// A beneficiary's accounting of how disbursed funds were spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidation {
    /// Unique identifier.
    pub id: Uuid,
    /// Parent disbursement.
    pub disbursement_id: Uuid,
    /// The beneficiary accounting for the funds.
    pub beneficiary_id: Uuid,
    /// Fund category, copied from the disbursement's request for display.
    pub category: FundCategory,
    /// The portion of the disbursement this liquidation claims was spent.
    pub claimed_amount: Money,
    /// Sum of attached receipt amounts.
    pub receipt_total: Money,
    /// Claimed amount minus receipt total, floored at zero.
    pub remaining_amount: Money,
    /// True when the receipts fully cover the claimed amount.
    pub is_complete: bool,
    /// Current status.
    pub status: LiquidationStatus,
    /// Caseworker-level decision record.
    pub caseworker_review: LevelReview,
    /// Finance-level decision record.
    pub finance_review: LevelReview,
    /// Director-level decision record.
    pub director_review: LevelReview,
    /// Level at which the liquidation was rejected, if it was.
    pub rejected_at_level: Option<ApprovalLevel>,
    /// Why the liquidation was rejected.
    pub rejection_reason: Option<String>,
    /// Attached receipts.
    pub receipts: Vec<Receipt>,
    /// When the liquidation was created.
    pub created_at: DateTime<Utc>,
    /// When the liquidation was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Liquidation {
    /// Returns the review record for a level.
    #[must_use]
    pub fn review_for(&self, level: ApprovalLevel) -> &LevelReview {
        match level {
            ApprovalLevel::Caseworker => &self.caseworker_review,
            ApprovalLevel::Finance => &self.finance_review,
            ApprovalLevel::Director => &self.director_review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_chain() {
        assert_eq!(ApprovalLevel::Caseworker.next(), Some(ApprovalLevel::Finance));
        assert_eq!(ApprovalLevel::Finance.next(), Some(ApprovalLevel::Director));
        assert_eq!(ApprovalLevel::Director.next(), None);
    }

    #[test]
    fn test_level_pending_status() {
        assert_eq!(
            ApprovalLevel::Finance.pending_status(),
            LiquidationStatus::PendingFinanceApproval
        );
        assert_eq!(
            LiquidationStatus::PendingFinanceApproval.awaiting_level(),
            Some(ApprovalLevel::Finance)
        );
    }

    #[test]
    fn test_level_required_role() {
        assert_eq!(
            ApprovalLevel::Caseworker.required_role(),
            ActorRole::Caseworker
        );
        assert_eq!(ApprovalLevel::Director.required_role(), ActorRole::Director);
    }

    #[test]
    fn test_status_terminal() {
        assert!(LiquidationStatus::Approved.is_terminal());
        assert!(LiquidationStatus::Rejected.is_terminal());
        assert!(!LiquidationStatus::Complete.is_terminal());
        assert!(!LiquidationStatus::PendingDirectorApproval.is_terminal());
    }

    #[test]
    fn test_status_accepts_receipts() {
        assert!(LiquidationStatus::Pending.accepts_receipts());
        assert!(LiquidationStatus::InProgress.accepts_receipts());
        assert!(!LiquidationStatus::Complete.accepts_receipts());
        assert!(!LiquidationStatus::PendingCaseworkerApproval.accepts_receipts());
        assert!(!LiquidationStatus::Rejected.accepts_receipts());
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            LiquidationStatus::Pending,
            LiquidationStatus::InProgress,
            LiquidationStatus::Complete,
            LiquidationStatus::PendingCaseworkerApproval,
            LiquidationStatus::PendingFinanceApproval,
            LiquidationStatus::PendingDirectorApproval,
            LiquidationStatus::Approved,
            LiquidationStatus::Rejected,
        ] {
            assert_eq!(LiquidationStatus::parse(s.as_str()), Some(s));
        }
    }
}
