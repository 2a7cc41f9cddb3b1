//! Property-based tests for the disbursement handoff machine.
//!
//! Validates forward-only ordering: observed statuses over any
//! operation sequence form a subsequence of the handoff chain.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use almoner_shared::types::Money;

use crate::aid_request::service::{AidRequestService, SubmitAidRequestInput};
use crate::aid_request::types::{FundCategory, ReviewDecision};
use crate::disbursement::service::DisbursementService;
use crate::disbursement::types::Disbursement;
use crate::role::ActorRole;

#[derive(Debug, Clone, Copy)]
enum Step {
    FinanceDisburse,
    CaseworkerReceive,
    CaseworkerDisburse,
    BeneficiaryReceive,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::FinanceDisburse),
        Just(Step::CaseworkerReceive),
        Just(Step::CaseworkerDisburse),
        Just(Step::BeneficiaryReceive),
    ]
}

fn new_disbursement() -> Disbursement {
    let request = AidRequestService::submit(
        SubmitAidRequestInput {
            beneficiary_id: Uuid::new_v4(),
            unit_id: None,
            category: FundCategory::Other,
            amount: Money::new(Decimal::new(100_000, 2)).unwrap(),
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

    DisbursementService::create_from_approved_request(&request, "DSB-PROP".to_string(), None)
        .expect("request is fully approved")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of handoff attempts yields a strictly increasing
    /// status position; failed attempts change nothing.
    #[test]
    fn prop_forward_only(steps in prop::collection::vec(arb_step(), 1..16)) {
        let mut disbursement = new_disbursement();
        let mut last_position = disbursement.status.position();

        for step in steps {
            let actor = Uuid::new_v4();
            let before = disbursement.clone();
            let result = match step {
                Step::FinanceDisburse => {
                    DisbursementService::finance_disburse(disbursement.clone(), actor)
                }
                Step::CaseworkerReceive => {
                    DisbursementService::caseworker_receive(disbursement.clone(), actor)
                }
                Step::CaseworkerDisburse => {
                    DisbursementService::caseworker_disburse(disbursement.clone(), actor)
                }
                Step::BeneficiaryReceive => {
                    DisbursementService::beneficiary_receive(disbursement.clone(), actor)
                }
            };

            match result {
                Ok(updated) => {
                    prop_assert_eq!(updated.status.position(), last_position + 1);
                    last_position = updated.status.position();
                    disbursement = updated;
                }
                Err(_) => {
                    prop_assert_eq!(&disbursement, &before);
                }
            }
        }
    }
}
