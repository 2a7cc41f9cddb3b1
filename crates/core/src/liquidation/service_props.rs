//! Property-based tests for the liquidation machine.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use almoner_shared::types::Money;

use crate::aid_request::service::{AidRequestService, SubmitAidRequestInput};
use crate::aid_request::types::{FundCategory, ReviewDecision};
use crate::disbursement::service::DisbursementService;
use crate::disbursement::types::Disbursement;
use crate::liquidation::service::{AttachReceiptInput, LiquidationService};
use crate::liquidation::types::Liquidation;
use crate::role::ActorRole;

fn received_disbursement(amount: Decimal) -> Disbursement {
    let request = AidRequestService::submit(
        SubmitAidRequestInput {
            beneficiary_id: Uuid::new_v4(),
            unit_id: None,
            category: FundCategory::Other,
            amount: Money::new(amount).unwrap(),
            period: None,
            purpose: "prop test".to_string(),
        },
        false,
    )
    .expect("valid submission");
    let request = [ActorRole::Caseworker, ActorRole::Finance, ActorRole::Director]
        .into_iter()
        .fold(request, |r, role| {
            AidRequestService::review(r, role, Uuid::new_v4(), ReviewDecision::Approve, None)
                .expect("in-order approval")
        });

    let d = DisbursementService::create_from_approved_request(&request, "DSB-PROP".into(), None)
        .expect("fully approved");
    let d = DisbursementService::finance_disburse(d, Uuid::new_v4()).expect("pending");
    let d = DisbursementService::caseworker_receive(d, Uuid::new_v4()).expect("disbursed");
    let d = DisbursementService::caseworker_disburse(d, Uuid::new_v4()).expect("received");
    DisbursementService::beneficiary_receive(d, Uuid::new_v4()).expect("handed over")
}

fn attach(liquidation: Liquidation, amount: Decimal) -> Result<Liquidation, crate::liquidation::error::LiquidationError> {
    LiquidationService::attach_receipt(
        liquidation,
        AttachReceiptInput {
            amount: Money::new(amount).expect("non-negative"),
            receipt_number: "R-PROP".to_string(),
            receipt_date: NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date"),
            description: None,
            file_ref: None,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Receipt total plus remaining always equals the claimed amount,
    /// and the total never exceeds the claim, no matter which receipt
    /// amounts are attempted in which order.
    #[test]
    fn prop_receipt_totals_conserved(
        claim in 100i64..10_000i64,
        amounts in prop::collection::vec(1i64..5_000i64, 1..10)
    ) {
        let claim = Decimal::new(claim, 0);
        let disbursement = received_disbursement(claim);
        let mut liquidation = LiquidationService::create(
            &disbursement,
            FundCategory::Other,
            Money::new(claim).unwrap(),
            Money::ZERO,
        )
        .expect("claim fits");

        for amount in amounts {
            if let Ok(updated) = attach(liquidation.clone(), Decimal::new(amount, 0)) {
                liquidation = updated;
            }

            let total = liquidation.receipt_total.amount();
            let remaining = liquidation.remaining_amount.amount();
            prop_assert_eq!(total + remaining, claim);
            prop_assert!(total <= claim);
            prop_assert_eq!(liquidation.is_complete, remaining == Decimal::ZERO);
        }
    }
}
