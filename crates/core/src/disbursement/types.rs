//! Disbursement domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use almoner_shared::types::Money;

/// Status of a disbursement in the handoff chain.
///
/// Transitions are strictly forward-only:
/// `Pending → FinanceDisbursed → CaseworkerReceived → CaseworkerDisbursed → BeneficiaryReceived`.
/// `Pending` is the creation state, before finance has released the
/// funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisbursementStatus {
    /// Created from an approved request; finance has not yet released funds.
    Pending,
    /// Finance released the funds.
    FinanceDisbursed,
    /// The caseworker received the funds from finance.
    CaseworkerReceived,
    /// The caseworker handed the funds to the beneficiary.
    CaseworkerDisbursed,
    /// The beneficiary confirmed receipt; liquidation may begin.
    BeneficiaryReceived,
}

impl DisbursementStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::FinanceDisbursed => "finance_disbursed",
            Self::CaseworkerReceived => "caseworker_received",
            Self::CaseworkerDisbursed => "caseworker_disbursed",
            Self::BeneficiaryReceived => "beneficiary_received",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "finance_disbursed" => Some(Self::FinanceDisbursed),
            "caseworker_received" => Some(Self::CaseworkerReceived),
            "caseworker_disbursed" => Some(Self::CaseworkerDisbursed),
            "beneficiary_received" => Some(Self::BeneficiaryReceived),
            _ => None,
        }
    }

    /// The next status in the chain, if any.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::FinanceDisbursed),
            Self::FinanceDisbursed => Some(Self::CaseworkerReceived),
            Self::CaseworkerReceived => Some(Self::CaseworkerDisbursed),
            Self::CaseworkerDisbursed => Some(Self::BeneficiaryReceived),
            Self::BeneficiaryReceived => None,
        }
    }

    /// Position in the chain, for ordering assertions.
    #[must_use]
    pub fn position(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::FinanceDisbursed => 1,
            Self::CaseworkerReceived => 2,
            Self::CaseworkerDisbursed => 3,
            Self::BeneficiaryReceived => 4,
        }
    }

    /// Returns true once the beneficiary has the funds.
    #[must_use]
    pub fn is_received(&self) -> bool {
        matches!(self, Self::BeneficiaryReceived)
    }
}

impl fmt::Display for DisbursementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived liquidation totals for a disbursement.
///
/// Written exclusively by the reconciliation engine; every other
/// component treats these fields as read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Sum of approved liquidation claims, clamped to the amount.
    pub liquidated_amount: Money,
    /// Amount minus liquidated amount, floored at zero.
    pub remaining_to_liquidate: Money,
    /// True when nothing remains to liquidate.
    pub fully_liquidated: bool,
    /// When the disbursement first became fully liquidated.
    pub fully_liquidated_at: Option<DateTime<Utc>>,
}

impl LedgerSnapshot {
    /// The snapshot of a fresh disbursement: nothing liquidated yet.
    #[must_use]
    pub fn opening(amount: Money) -> Self {
        Self {
            liquidated_amount: Money::ZERO,
            remaining_to_liquidate: amount,
            fully_liquidated: false,
            fully_liquidated_at: None,
        }
    }
}

/// A single funds handoff tied 1:1 to a fully-approved aid request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disbursement {
    /// Unique identifier.
    pub id: Uuid,
    /// The approved aid request this disbursement pays out.
    pub aid_request_id: Uuid,
    /// The receiving beneficiary.
    pub beneficiary_id: Uuid,
    /// Amount, equal to the request's approved amount.
    pub amount: Money,
    /// Current handoff status.
    pub status: DisbursementStatus,
    /// Reference number for the physical handoff paperwork.
    pub reference_number: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Finance actor and time of the release.
    pub finance_disbursed_by: Option<Uuid>,
    /// When finance released the funds.
    pub finance_disbursed_at: Option<DateTime<Utc>>,
    /// Caseworker who received the funds.
    pub caseworker_received_by: Option<Uuid>,
    /// When the caseworker received the funds.
    pub caseworker_received_at: Option<DateTime<Utc>>,
    /// Caseworker who handed the funds over.
    pub caseworker_disbursed_by: Option<Uuid>,
    /// When the caseworker handed the funds over.
    pub caseworker_disbursed_at: Option<DateTime<Utc>>,
    /// Beneficiary who confirmed receipt.
    pub beneficiary_received_by: Option<Uuid>,
    /// When the beneficiary confirmed receipt.
    pub beneficiary_received_at: Option<DateTime<Utc>>,
    /// Derived liquidation totals.
    pub ledger: LedgerSnapshot,
    /// When the disbursement was created.
    pub created_at: DateTime<Utc>,
    /// When the disbursement was last updated.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_chain_order() {
        let mut status = DisbursementStatus::Pending;
        let mut seen = vec![status];
        while let Some(next) = status.next() {
            assert!(next.position() == status.position() + 1);
            status = next;
            seen.push(status);
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(status, DisbursementStatus::BeneficiaryReceived);
    }

    #[rstest]
    #[case(DisbursementStatus::Pending, "pending")]
    #[case(DisbursementStatus::FinanceDisbursed, "finance_disbursed")]
    #[case(DisbursementStatus::CaseworkerReceived, "caseworker_received")]
    #[case(DisbursementStatus::CaseworkerDisbursed, "caseworker_disbursed")]
    #[case(DisbursementStatus::BeneficiaryReceived, "beneficiary_received")]
    fn test_status_round_trip(#[case] status: DisbursementStatus, #[case] text: &str) {
        assert_eq!(status.as_str(), text);
        assert_eq!(DisbursementStatus::parse(text), Some(status));
    }

    #[test]
    fn test_status_parse_unknown() {
        assert_eq!(DisbursementStatus::parse("unknown"), None);
    }

    #[test]
    fn test_opening_snapshot() {
        let amount = Money::new(dec!(1000)).unwrap();
        let snapshot = LedgerSnapshot::opening(amount);
        assert_eq!(snapshot.liquidated_amount, Money::ZERO);
        assert_eq!(snapshot.remaining_to_liquidate, amount);
        assert!(!snapshot.fully_liquidated);
        assert!(snapshot.fully_liquidated_at.is_none());
    }
}
