//! Disbursement creation and handoff transition logic.
//!
//! Pure functions: entity in, actor in, updated entity or typed error
//! out. The repository wraps each in a row-locked transaction.

use chrono::Utc;
use uuid::Uuid;

use crate::aid_request::types::AidRequest;
use crate::disbursement::error::DisbursementError;
use crate::disbursement::types::{Disbursement, DisbursementStatus, LedgerSnapshot};

/// Stateless service for disbursement lifecycle transitions.
pub struct DisbursementService;

impl DisbursementService {
    /// Creates a disbursement for a fully-approved aid request.
    ///
    /// The amount is copied from the request's approved amount; the
    /// one-per-request rule is enforced by the repository's unique
    /// index.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFullyApproved` unless every review stage of
    /// the request is approved.
    pub fn create_from_approved_request(
        request: &AidRequest,
        reference_number: String,
        notes: Option<String>,
    ) -> Result<Disbursement, DisbursementError> {
        if !request.is_fully_approved() {
            return Err(DisbursementError::RequestNotFullyApproved(request.id));
        }

        let now = Utc::now();
        Ok(Disbursement {
            id: Uuid::now_v7(),
            aid_request_id: request.id,
            beneficiary_id: request.beneficiary_id,
            amount: request.amount,
            status: DisbursementStatus::Pending,
            reference_number,
            notes,
            finance_disbursed_by: None,
            finance_disbursed_at: None,
            caseworker_received_by: None,
            caseworker_received_at: None,
            caseworker_disbursed_by: None,
            caseworker_disbursed_at: None,
            beneficiary_received_by: None,
            beneficiary_received_at: None,
            ledger: LedgerSnapshot::opening(request.amount),
            created_at: now,
            updated_at: now,
        })
    }

    /// Finance releases the funds.
    pub fn finance_disburse(
        disbursement: Disbursement,
        actor: Uuid,
    ) -> Result<Disbursement, DisbursementError> {
        Self::step(
            disbursement,
            DisbursementStatus::Pending,
            DisbursementStatus::FinanceDisbursed,
            |d, now| {
                d.finance_disbursed_by = Some(actor);
                d.finance_disbursed_at = Some(now);
            },
        )
    }

    /// The caseworker acknowledges receiving the funds from finance.
    pub fn caseworker_receive(
        disbursement: Disbursement,
        actor: Uuid,
    ) -> Result<Disbursement, DisbursementError> {
        Self::step(
            disbursement,
            DisbursementStatus::FinanceDisbursed,
            DisbursementStatus::CaseworkerReceived,
            |d, now| {
                d.caseworker_received_by = Some(actor);
                d.caseworker_received_at = Some(now);
            },
        )
    }

    /// The caseworker hands the funds to the beneficiary.
    pub fn caseworker_disburse(
        disbursement: Disbursement,
        actor: Uuid,
    ) -> Result<Disbursement, DisbursementError> {
        Self::step(
            disbursement,
            DisbursementStatus::CaseworkerReceived,
            DisbursementStatus::CaseworkerDisbursed,
            |d, now| {
                d.caseworker_disbursed_by = Some(actor);
                d.caseworker_disbursed_at = Some(now);
            },
        )
    }

    /// The beneficiary confirms receipt; liquidation may begin.
    pub fn beneficiary_receive(
        disbursement: Disbursement,
        actor: Uuid,
    ) -> Result<Disbursement, DisbursementError> {
        Self::step(
            disbursement,
            DisbursementStatus::CaseworkerDisbursed,
            DisbursementStatus::BeneficiaryReceived,
            |d, now| {
                d.beneficiary_received_by = Some(actor);
                d.beneficiary_received_at = Some(now);
            },
        )
    }

    /// Checks whether a disbursement may be deleted.
    ///
    /// Denied while any liquidation of the disbursement is not yet
    /// terminal; this rule lives here, not in storage cascade
    /// behavior.
    pub fn ensure_deletable(active_liquidations: usize) -> Result<(), DisbursementError> {
        if active_liquidations > 0 {
            return Err(DisbursementError::HasActiveLiquidations {
                count: active_liquidations,
            });
        }
        Ok(())
    }

    fn step(
        mut disbursement: Disbursement,
        expected: DisbursementStatus,
        to: DisbursementStatus,
        record: impl FnOnce(&mut Disbursement, chrono::DateTime<Utc>),
    ) -> Result<Disbursement, DisbursementError> {
        if disbursement.status != expected {
            return Err(DisbursementError::InvalidDisbursementTransition {
                current: disbursement.status,
                expected,
            });
        }

        let now = Utc::now();
        disbursement.status = to;
        record(&mut disbursement, now);
        disbursement.updated_at = now;
        Ok(disbursement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use almoner_shared::types::Money;

    use crate::aid_request::service::{AidRequestService, SubmitAidRequestInput};
    use crate::aid_request::types::{FundCategory, ReviewDecision};
    use crate::role::ActorRole;

    fn approved_request() -> AidRequest {
        let request = AidRequestService::submit(
            SubmitAidRequestInput {
                beneficiary_id: Uuid::new_v4(),
                unit_id: None,
                category: FundCategory::Tuition,
                amount: Money::new(dec!(1000)).unwrap(),
                period: None,
                purpose: "Books".to_string(),
            },
            false,
        )
        .unwrap();

        [ActorRole::Caseworker, ActorRole::Finance, ActorRole::Director]
            .into_iter()
            .fold(request, |r, role| {
                AidRequestService::review(r, role, Uuid::new_v4(), ReviewDecision::Approve, None)
                    .unwrap()
            })
    }

    fn new_disbursement() -> Disbursement {
        DisbursementService::create_from_approved_request(
            &approved_request(),
            "DSB-0001".to_string(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_create_from_approved_request() {
        let disbursement = new_disbursement();
        assert_eq!(disbursement.status, DisbursementStatus::Pending);
        assert_eq!(disbursement.amount.amount(), dec!(1000));
        assert_eq!(disbursement.ledger.remaining_to_liquidate.amount(), dec!(1000));
        assert!(!disbursement.ledger.fully_liquidated);
    }

    #[test]
    fn test_create_from_unapproved_request_fails() {
        let request = AidRequestService::submit(
            SubmitAidRequestInput {
                beneficiary_id: Uuid::new_v4(),
                unit_id: None,
                category: FundCategory::Tuition,
                amount: Money::new(dec!(1000)).unwrap(),
                period: None,
                purpose: "Books".to_string(),
            },
            false,
        )
        .unwrap();

        let result = DisbursementService::create_from_approved_request(
            &request,
            "DSB-0002".to_string(),
            None,
        );
        assert!(matches!(
            result,
            Err(DisbursementError::RequestNotFullyApproved(_))
        ));
    }

    #[test]
    fn test_full_handoff_chain() {
        let finance = Uuid::new_v4();
        let caseworker = Uuid::new_v4();
        let beneficiary = Uuid::new_v4();

        let d = new_disbursement();
        let d = DisbursementService::finance_disburse(d, finance).unwrap();
        assert_eq!(d.status, DisbursementStatus::FinanceDisbursed);
        assert_eq!(d.finance_disbursed_by, Some(finance));

        let d = DisbursementService::caseworker_receive(d, caseworker).unwrap();
        assert_eq!(d.status, DisbursementStatus::CaseworkerReceived);

        let d = DisbursementService::caseworker_disburse(d, caseworker).unwrap();
        assert_eq!(d.status, DisbursementStatus::CaseworkerDisbursed);

        let d = DisbursementService::beneficiary_receive(d, beneficiary).unwrap();
        assert_eq!(d.status, DisbursementStatus::BeneficiaryReceived);
        assert!(d.beneficiary_received_at.is_some());
    }

    #[test]
    fn test_skipping_a_step_fails() {
        let d = new_disbursement();
        let result = DisbursementService::caseworker_receive(d, Uuid::new_v4());
        assert!(matches!(
            result,
            Err(DisbursementError::InvalidDisbursementTransition {
                current: DisbursementStatus::Pending,
                expected: DisbursementStatus::FinanceDisbursed,
            })
        ));
    }

    #[test]
    fn test_repeating_a_step_fails() {
        let d = new_disbursement();
        let d = DisbursementService::finance_disburse(d, Uuid::new_v4()).unwrap();
        let result = DisbursementService::finance_disburse(d, Uuid::new_v4());
        assert!(matches!(
            result,
            Err(DisbursementError::InvalidDisbursementTransition { .. })
        ));
    }

    #[test]
    fn test_ensure_deletable() {
        assert!(DisbursementService::ensure_deletable(0).is_ok());
        assert!(matches!(
            DisbursementService::ensure_deletable(3),
            Err(DisbursementError::HasActiveLiquidations { count: 3 })
        ));
    }
}
