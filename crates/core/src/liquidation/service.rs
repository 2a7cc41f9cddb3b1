//! Liquidation lifecycle logic.
//!
//! Pure functions over the liquidation aggregate. Totals are always
//! recomputed from the attached receipts, never incremented, so a
//! retried operation cannot double-count.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use almoner_shared::types::Money;

use crate::aid_request::types::FundCategory;
use crate::disbursement::types::Disbursement;
use crate::liquidation::error::LiquidationError;
use crate::liquidation::types::{
    ApprovalLevel, LevelReview, Liquidation, LiquidationStatus, Receipt, VerificationStatus,
};

/// Input for attaching a receipt to a liquidation.
#[derive(Debug, Clone)]
pub struct AttachReceiptInput {
    /// Receipt amount.
    pub amount: Money,
    /// Vendor receipt number.
    pub receipt_number: String,
    /// Date on the receipt.
    pub receipt_date: NaiveDate,
    /// Free-text description of the expense.
    pub description: Option<String>,
    /// Opaque reference into the external file store.
    pub file_ref: Option<String>,
}

/// Stateless service for liquidation lifecycle transitions.
pub struct LiquidationService;

impl LiquidationService {
    /// Creates a liquidation against a received disbursement.
    ///
    /// `outstanding_sibling_claims` is the sum of claimed amounts over
    /// the disbursement's other non-terminal liquidations, read by the
    /// repository inside the same transaction. A new claim may only
    /// cover what no approved or in-flight liquidation has spoken for.
    ///
    /// # Errors
    ///
    /// * `NotLiquidatable` before the beneficiary has the funds
    /// * `ClaimAmountNotPositive` for a zero claim
    /// * `OverLiquidation` if the claim exceeds the uncommitted remainder
    pub fn create(
        disbursement: &Disbursement,
        category: FundCategory,
        claimed_amount: Money,
        outstanding_sibling_claims: Money,
    ) -> Result<Liquidation, LiquidationError> {
        if !disbursement.status.is_received() {
            return Err(LiquidationError::NotLiquidatable {
                status: disbursement.status,
            });
        }
        if claimed_amount.is_zero() {
            return Err(LiquidationError::ClaimAmountNotPositive);
        }

        let available = disbursement
            .ledger
            .remaining_to_liquidate
            .saturating_sub(outstanding_sibling_claims);
        if claimed_amount > available {
            return Err(LiquidationError::OverLiquidation {
                attempted: claimed_amount.amount(),
                available: available.amount(),
            });
        }

        let now = Utc::now();
        Ok(Liquidation {
            id: Uuid::now_v7(),
            disbursement_id: disbursement.id,
            beneficiary_id: disbursement.beneficiary_id,
            category,
            claimed_amount,
            receipt_total: Money::ZERO,
            remaining_amount: claimed_amount,
            is_complete: false,
            status: LiquidationStatus::Pending,
            caseworker_review: LevelReview::default(),
            finance_review: LevelReview::default(),
            director_review: LevelReview::default(),
            rejected_at_level: None,
            rejection_reason: None,
            receipts: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Attaches a receipt and re-derives the liquidation totals.
    ///
    /// Moves `Pending → InProgress` on the first receipt and to
    /// `Complete` when the receipts fully cover the claimed amount.
    ///
    /// # Errors
    ///
    /// * `LiquidationAlreadyTerminal` once approved or rejected
    /// * `ReceiptsSealed` after submission for approval
    /// * `ReceiptAmountNotPositive` for a zero receipt
    /// * `OverLiquidation` if receipts would exceed the claimed amount;
    ///   existing receipts are untouched
    pub fn attach_receipt(
        mut liquidation: Liquidation,
        input: AttachReceiptInput,
    ) -> Result<Liquidation, LiquidationError> {
        if liquidation.status.is_terminal() {
            return Err(LiquidationError::LiquidationAlreadyTerminal {
                status: liquidation.status,
            });
        }
        if liquidation.status.awaiting_level().is_some() {
            return Err(LiquidationError::ReceiptsSealed {
                status: liquidation.status,
            });
        }
        if input.amount.is_zero() {
            return Err(LiquidationError::ReceiptAmountNotPositive);
        }

        let new_total = liquidation
            .receipt_total
            .checked_add(input.amount)
            .ok_or(LiquidationError::OverLiquidation {
                attempted: input.amount.amount(),
                available: liquidation.remaining_amount.amount(),
            })?;
        if new_total > liquidation.claimed_amount {
            return Err(LiquidationError::OverLiquidation {
                attempted: new_total.amount(),
                available: liquidation.remaining_amount.amount(),
            });
        }

        let now = Utc::now();
        liquidation.receipts.push(Receipt {
            id: Uuid::now_v7(),
            liquidation_id: liquidation.id,
            amount: input.amount,
            receipt_number: input.receipt_number,
            receipt_date: input.receipt_date,
            description: input.description,
            file_ref: input.file_ref,
            verification_status: VerificationStatus::Pending,
            verification_notes: None,
            created_at: now,
        });

        Self::rederive_totals(&mut liquidation);
        liquidation.status = if liquidation.is_complete {
            LiquidationStatus::Complete
        } else {
            LiquidationStatus::InProgress
        };
        liquidation.updated_at = now;

        Ok(liquidation)
    }

    /// Submits a complete liquidation into the approval chain.
    ///
    /// # Errors
    ///
    /// * `LiquidationAlreadyTerminal` once approved or rejected
    /// * `NotReadyForSubmission` unless the status is `Complete`
    pub fn submit_for_approval(
        mut liquidation: Liquidation,
    ) -> Result<Liquidation, LiquidationError> {
        if liquidation.status.is_terminal() {
            return Err(LiquidationError::LiquidationAlreadyTerminal {
                status: liquidation.status,
            });
        }
        if liquidation.status != LiquidationStatus::Complete {
            return Err(LiquidationError::NotReadyForSubmission {
                status: liquidation.status,
            });
        }

        liquidation.status = LiquidationStatus::PendingCaseworkerApproval;
        liquidation.updated_at = Utc::now();
        Ok(liquidation)
    }

    /// Records an approval at `level`.
    ///
    /// Advances to the next level's pending status, or to `Approved`
    /// after the director - at which point the caller must run the
    /// reconciliation engine in the same transaction.
    ///
    /// # Errors
    ///
    /// * `LiquidationAlreadyTerminal` once approved or rejected
    /// * `ApprovalLevelMismatch` unless the status awaits exactly `level`
    pub fn approve(
        mut liquidation: Liquidation,
        level: ApprovalLevel,
        approver: Uuid,
        notes: Option<String>,
    ) -> Result<Liquidation, LiquidationError> {
        Self::check_level(&liquidation, level)?;

        let now = Utc::now();
        let review = LevelReview {
            approver: Some(approver),
            decided_at: Some(now),
            notes,
        };
        match level {
            ApprovalLevel::Caseworker => liquidation.caseworker_review = review,
            ApprovalLevel::Finance => liquidation.finance_review = review,
            ApprovalLevel::Director => liquidation.director_review = review,
        }

        liquidation.status = match level.next() {
            Some(next) => next.pending_status(),
            None => LiquidationStatus::Approved,
        };
        liquidation.updated_at = now;
        Ok(liquidation)
    }

    /// Records a rejection at `level`; terminal for the liquidation.
    ///
    /// The beneficiary must create a new liquidation; a rejected one is
    /// never reopened, and it never contributes to the disbursement
    /// ledger.
    ///
    /// # Errors
    ///
    /// * `LiquidationAlreadyTerminal` once approved or rejected
    /// * `ApprovalLevelMismatch` unless the status awaits exactly `level`
    /// * `RejectionReasonRequired` if the reason is empty
    pub fn reject(
        mut liquidation: Liquidation,
        level: ApprovalLevel,
        approver: Uuid,
        reason: String,
    ) -> Result<Liquidation, LiquidationError> {
        Self::check_level(&liquidation, level)?;
        if reason.trim().is_empty() {
            return Err(LiquidationError::RejectionReasonRequired);
        }

        let now = Utc::now();
        let review = LevelReview {
            approver: Some(approver),
            decided_at: Some(now),
            notes: Some(reason.clone()),
        };
        match level {
            ApprovalLevel::Caseworker => liquidation.caseworker_review = review,
            ApprovalLevel::Finance => liquidation.finance_review = review,
            ApprovalLevel::Director => liquidation.director_review = review,
        }

        liquidation.status = LiquidationStatus::Rejected;
        liquidation.rejected_at_level = Some(level);
        liquidation.rejection_reason = Some(reason);
        liquidation.updated_at = now;
        Ok(liquidation)
    }

    /// Updates the verification state of one receipt.
    ///
    /// Receipt amounts are immutable once verification begins; only the
    /// verification status and notes may change, and only while the
    /// liquidation is not terminal.
    ///
    /// # Errors
    ///
    /// * `LiquidationAlreadyTerminal` once approved or rejected
    /// * `ReceiptNotFound` if the receipt is not on this liquidation
    pub fn review_receipt(
        mut liquidation: Liquidation,
        receipt_id: Uuid,
        verification: VerificationStatus,
        notes: Option<String>,
    ) -> Result<Liquidation, LiquidationError> {
        if liquidation.status.is_terminal() {
            return Err(LiquidationError::LiquidationAlreadyTerminal {
                status: liquidation.status,
            });
        }

        let receipt = liquidation
            .receipts
            .iter_mut()
            .find(|r| r.id == receipt_id)
            .ok_or(LiquidationError::ReceiptNotFound(receipt_id))?;
        receipt.verification_status = verification;
        receipt.verification_notes = notes;

        liquidation.updated_at = Utc::now();
        Ok(liquidation)
    }

    fn check_level(
        liquidation: &Liquidation,
        level: ApprovalLevel,
    ) -> Result<(), LiquidationError> {
        if liquidation.status.is_terminal() {
            return Err(LiquidationError::LiquidationAlreadyTerminal {
                status: liquidation.status,
            });
        }
        if liquidation.status.awaiting_level() != Some(level) {
            return Err(LiquidationError::ApprovalLevelMismatch {
                status: liquidation.status,
                level,
            });
        }
        Ok(())
    }

    /// Re-derives receipt total, remaining amount, and completeness from
    /// the attached receipts.
    fn rederive_totals(liquidation: &mut Liquidation) {
        let total = liquidation
            .receipts
            .iter()
            .try_fold(Money::ZERO, |acc, r| acc.checked_add(r.amount))
            .unwrap_or(liquidation.claimed_amount);
        liquidation.receipt_total = total;
        liquidation.remaining_amount = liquidation.claimed_amount.saturating_sub(total);
        liquidation.is_complete = liquidation.remaining_amount.is_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::aid_request::service::{AidRequestService, SubmitAidRequestInput};
    use crate::aid_request::types::ReviewDecision;
    use crate::disbursement::service::DisbursementService;
    use crate::role::ActorRole;

    fn money(d: Decimal) -> Money {
        Money::new(d).unwrap()
    }

    fn received_disbursement(amount: Decimal) -> Disbursement {
        let request = AidRequestService::submit(
            SubmitAidRequestInput {
                beneficiary_id: Uuid::new_v4(),
                unit_id: None,
                category: FundCategory::Tuition,
                amount: money(amount),
                period: None,
                purpose: "Lab fees".to_string(),
            },
            false,
        )
        .unwrap();
        let request = [ActorRole::Caseworker, ActorRole::Finance, ActorRole::Director]
            .into_iter()
            .fold(request, |r, role| {
                AidRequestService::review(r, role, Uuid::new_v4(), ReviewDecision::Approve, None)
                    .unwrap()
            });

        let d = DisbursementService::create_from_approved_request(
            &request,
            "DSB-1000".to_string(),
            None,
        )
        .unwrap();
        let d = DisbursementService::finance_disburse(d, Uuid::new_v4()).unwrap();
        let d = DisbursementService::caseworker_receive(d, Uuid::new_v4()).unwrap();
        let d = DisbursementService::caseworker_disburse(d, Uuid::new_v4()).unwrap();
        DisbursementService::beneficiary_receive(d, Uuid::new_v4()).unwrap()
    }

    fn receipt(amount: Decimal) -> AttachReceiptInput {
        AttachReceiptInput {
            amount: money(amount),
            receipt_number: "R-001".to_string(),
            receipt_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            description: Some("Groceries".to_string()),
            file_ref: Some("receipts/r-001.jpg".to_string()),
        }
    }

    fn submitted_liquidation(amount: Decimal) -> Liquidation {
        let disbursement = received_disbursement(amount);
        let liquidation = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(amount),
            Money::ZERO,
        )
        .unwrap();
        let liquidation =
            LiquidationService::attach_receipt(liquidation, receipt(amount)).unwrap();
        LiquidationService::submit_for_approval(liquidation).unwrap()
    }

    #[test]
    fn test_create_requires_received_disbursement() {
        let request = AidRequestService::submit(
            SubmitAidRequestInput {
                beneficiary_id: Uuid::new_v4(),
                unit_id: None,
                category: FundCategory::Tuition,
                amount: money(dec!(1000)),
                period: None,
                purpose: "Lab fees".to_string(),
            },
            false,
        )
        .unwrap();
        let request = [ActorRole::Caseworker, ActorRole::Finance, ActorRole::Director]
            .into_iter()
            .fold(request, |r, role| {
                AidRequestService::review(r, role, Uuid::new_v4(), ReviewDecision::Approve, None)
                    .unwrap()
            });
        let disbursement = DisbursementService::create_from_approved_request(
            &request,
            "DSB-1001".to_string(),
            None,
        )
        .unwrap();

        let result = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(dec!(100)),
            Money::ZERO,
        );
        assert!(matches!(result, Err(LiquidationError::NotLiquidatable { .. })));
    }

    #[test]
    fn test_attach_receipts_until_complete() {
        let disbursement = received_disbursement(dec!(1000));
        let liquidation = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(dec!(1000)),
            Money::ZERO,
        )
        .unwrap();
        assert_eq!(liquidation.status, LiquidationStatus::Pending);

        let liquidation =
            LiquidationService::attach_receipt(liquidation, receipt(dec!(600))).unwrap();
        assert_eq!(liquidation.status, LiquidationStatus::InProgress);
        assert_eq!(liquidation.receipt_total.amount(), dec!(600));
        assert_eq!(liquidation.remaining_amount.amount(), dec!(400));
        assert!(!liquidation.is_complete);

        let liquidation =
            LiquidationService::attach_receipt(liquidation, receipt(dec!(400))).unwrap();
        assert_eq!(liquidation.status, LiquidationStatus::Complete);
        assert!(liquidation.is_complete);
        assert!(liquidation.remaining_amount.is_zero());
    }

    #[test]
    fn test_over_liquidation_reports_exact_remaining() {
        let disbursement = received_disbursement(dec!(1000));
        let liquidation = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(dec!(1000)),
            Money::ZERO,
        )
        .unwrap();
        let liquidation =
            LiquidationService::attach_receipt(liquidation, receipt(dec!(600))).unwrap();

        let result = LiquidationService::attach_receipt(liquidation.clone(), receipt(dec!(500)));
        match result {
            Err(LiquidationError::OverLiquidation { attempted, available }) => {
                assert_eq!(attempted, dec!(1100));
                assert_eq!(available, dec!(400));
            }
            other => panic!("Expected OverLiquidation, got {other:?}"),
        }

        // Existing receipts are untouched by the failed attempt.
        assert_eq!(liquidation.receipts.len(), 1);
        assert_eq!(liquidation.receipt_total.amount(), dec!(600));
    }

    #[test]
    fn test_second_claim_cannot_exceed_uncommitted_remainder() {
        // Scenario: 600 + 500 against a 1000 disbursement.
        let disbursement = received_disbursement(dec!(1000));
        let first = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(dec!(600)),
            Money::ZERO,
        )
        .unwrap();

        let result = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(dec!(500)),
            first.claimed_amount,
        );
        match result {
            Err(LiquidationError::OverLiquidation { attempted, available }) => {
                assert_eq!(attempted, dec!(500));
                assert_eq!(available, dec!(400));
            }
            other => panic!("Expected OverLiquidation, got {other:?}"),
        }

        // Once the first claim is rejected, the remainder frees up.
        let result = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(dec!(500)),
            Money::ZERO,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_submit_requires_complete() {
        let disbursement = received_disbursement(dec!(1000));
        let liquidation = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(dec!(1000)),
            Money::ZERO,
        )
        .unwrap();
        let liquidation =
            LiquidationService::attach_receipt(liquidation, receipt(dec!(600))).unwrap();

        let result = LiquidationService::submit_for_approval(liquidation);
        assert!(matches!(
            result,
            Err(LiquidationError::NotReadyForSubmission {
                status: LiquidationStatus::InProgress,
            })
        ));
    }

    #[test]
    fn test_receipts_sealed_after_submission() {
        let liquidation = submitted_liquidation(dec!(1000));
        let result = LiquidationService::attach_receipt(liquidation, receipt(dec!(10)));
        assert!(matches!(result, Err(LiquidationError::ReceiptsSealed { .. })));
    }

    #[test]
    fn test_approval_chain_in_order() {
        let liquidation = submitted_liquidation(dec!(1000));
        assert_eq!(
            liquidation.status,
            LiquidationStatus::PendingCaseworkerApproval
        );

        let liquidation = LiquidationService::approve(
            liquidation,
            ApprovalLevel::Caseworker,
            Uuid::new_v4(),
            None,
        )
        .unwrap();
        assert_eq!(liquidation.status, LiquidationStatus::PendingFinanceApproval);

        let liquidation = LiquidationService::approve(
            liquidation,
            ApprovalLevel::Finance,
            Uuid::new_v4(),
            Some("Verified against ledger".to_string()),
        )
        .unwrap();
        assert_eq!(
            liquidation.status,
            LiquidationStatus::PendingDirectorApproval
        );

        let liquidation = LiquidationService::approve(
            liquidation,
            ApprovalLevel::Director,
            Uuid::new_v4(),
            None,
        )
        .unwrap();
        assert_eq!(liquidation.status, LiquidationStatus::Approved);
        assert!(liquidation.director_review.decided_at.is_some());
    }

    #[test]
    fn test_approve_wrong_level_fails() {
        let liquidation = submitted_liquidation(dec!(1000));
        let result = LiquidationService::approve(
            liquidation,
            ApprovalLevel::Finance,
            Uuid::new_v4(),
            None,
        );
        assert!(matches!(
            result,
            Err(LiquidationError::ApprovalLevelMismatch {
                status: LiquidationStatus::PendingCaseworkerApproval,
                level: ApprovalLevel::Finance,
            })
        ));
    }

    #[test]
    fn test_reject_records_level_and_reason() {
        let liquidation = submitted_liquidation(dec!(1000));
        let liquidation = LiquidationService::approve(
            liquidation,
            ApprovalLevel::Caseworker,
            Uuid::new_v4(),
            None,
        )
        .unwrap();

        let liquidation = LiquidationService::reject(
            liquidation,
            ApprovalLevel::Finance,
            Uuid::new_v4(),
            "Receipts do not match vendor records".to_string(),
        )
        .unwrap();
        assert_eq!(liquidation.status, LiquidationStatus::Rejected);
        assert_eq!(liquidation.rejected_at_level, Some(ApprovalLevel::Finance));
        assert_eq!(
            liquidation.rejection_reason.as_deref(),
            Some("Receipts do not match vendor records")
        );
    }

    #[test]
    fn test_reject_requires_reason() {
        let liquidation = submitted_liquidation(dec!(1000));
        let result = LiquidationService::reject(
            liquidation,
            ApprovalLevel::Caseworker,
            Uuid::new_v4(),
            "  ".to_string(),
        );
        assert!(matches!(
            result,
            Err(LiquidationError::RejectionReasonRequired)
        ));
    }

    #[test]
    fn test_terminal_blocks_everything() {
        let liquidation = submitted_liquidation(dec!(1000));
        let rejected = LiquidationService::reject(
            liquidation,
            ApprovalLevel::Caseworker,
            Uuid::new_v4(),
            "Duplicate receipts".to_string(),
        )
        .unwrap();

        let approve = LiquidationService::approve(
            rejected.clone(),
            ApprovalLevel::Caseworker,
            Uuid::new_v4(),
            None,
        );
        assert!(matches!(
            approve,
            Err(LiquidationError::LiquidationAlreadyTerminal {
                status: LiquidationStatus::Rejected,
            })
        ));

        let reject = LiquidationService::reject(
            rejected.clone(),
            ApprovalLevel::Caseworker,
            Uuid::new_v4(),
            "again".to_string(),
        );
        assert!(matches!(
            reject,
            Err(LiquidationError::LiquidationAlreadyTerminal { .. })
        ));

        let attach = LiquidationService::attach_receipt(rejected, receipt(dec!(10)));
        assert!(matches!(
            attach,
            Err(LiquidationError::LiquidationAlreadyTerminal { .. })
        ));
    }

    #[test]
    fn test_review_receipt_updates_verification_only() {
        let liquidation = submitted_liquidation(dec!(1000));
        let receipt_id = liquidation.receipts[0].id;
        let before_total = liquidation.receipt_total;

        let liquidation = LiquidationService::review_receipt(
            liquidation,
            receipt_id,
            VerificationStatus::Questioned,
            Some("Date is illegible".to_string()),
        )
        .unwrap();

        let receipt = &liquidation.receipts[0];
        assert_eq!(receipt.verification_status, VerificationStatus::Questioned);
        assert_eq!(
            receipt.verification_notes.as_deref(),
            Some("Date is illegible")
        );
        assert_eq!(liquidation.receipt_total, before_total);
    }

    #[test]
    fn test_review_receipt_unknown_id_fails() {
        let liquidation = submitted_liquidation(dec!(1000));
        let result = LiquidationService::review_receipt(
            liquidation,
            Uuid::new_v4(),
            VerificationStatus::Verified,
            None,
        );
        assert!(matches!(result, Err(LiquidationError::ReceiptNotFound(_))));
    }

    #[test]
    fn test_zero_receipt_amount_fails() {
        let disbursement = received_disbursement(dec!(1000));
        let liquidation = LiquidationService::create(
            &disbursement,
            FundCategory::Tuition,
            money(dec!(1000)),
            Money::ZERO,
        )
        .unwrap();
        let result = LiquidationService::attach_receipt(
            liquidation,
            AttachReceiptInput {
                amount: Money::ZERO,
                ..receipt(dec!(0))
            },
        );
        assert!(matches!(
            result,
            Err(LiquidationError::ReceiptAmountNotPositive)
        ));
    }
}
