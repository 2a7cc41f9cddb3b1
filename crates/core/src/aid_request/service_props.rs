//! Property-based tests for the aid request stage machine.
//!
//! Validates the stage-ordering invariant: no later stage is ever
//! decided while an earlier stage is not approved, regardless of the
//! order in which reviewers attempt decisions.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use almoner_shared::types::Money;

use crate::aid_request::service::{AidRequestService, SubmitAidRequestInput};
use crate::aid_request::types::{AidRequest, FundCategory, ReviewDecision, StageDecision};
use crate::role::ActorRole;

fn new_request() -> AidRequest {
    AidRequestService::submit(
        SubmitAidRequestInput {
            beneficiary_id: Uuid::new_v4(),
            unit_id: None,
            category: FundCategory::Tuition,
            amount: Money::new(Decimal::new(50_000, 2)).unwrap(),
            period: None,
            purpose: "prop test".to_string(),
        },
        false,
    )
    .expect("submission is valid")
}

fn arb_role() -> impl Strategy<Value = ActorRole> {
    prop_oneof![
        Just(ActorRole::Beneficiary),
        Just(ActorRole::Caseworker),
        Just(ActorRole::Finance),
        Just(ActorRole::Director),
        Just(ActorRole::Admin),
    ]
}

fn arb_decision() -> impl Strategy<Value = ReviewDecision> {
    prop_oneof![Just(ReviewDecision::Approve), Just(ReviewDecision::Reject)]
}

/// Decisions are in stage order: a non-pending stage implies every
/// earlier stage is approved.
fn stage_order_holds(request: &AidRequest) -> bool {
    let finance_ok = request.finance_review.decision == StageDecision::Pending
        || request.caseworker_review.decision == StageDecision::Approved;
    let director_ok = request.director_review.decision == StageDecision::Pending
        || (request.caseworker_review.decision == StageDecision::Approved
            && request.finance_review.decision == StageDecision::Approved);
    finance_ok && director_ok
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Applying any sequence of review attempts preserves stage order,
    /// and at most one stage is ever rejected.
    #[test]
    fn prop_stage_ordering(
        ops in prop::collection::vec((arb_role(), arb_decision()), 1..12)
    ) {
        let mut request = new_request();

        for (role, decision) in ops {
            let notes = matches!(decision, ReviewDecision::Reject)
                .then(|| "prop rejection".to_string());
            match AidRequestService::review(
                request.clone(),
                role,
                Uuid::new_v4(),
                decision,
                notes,
            ) {
                Ok(updated) => request = updated,
                Err(_) => {} // rejected attempts must not mutate anything
            }

            prop_assert!(stage_order_holds(&request));

            let rejected_count = [
                &request.caseworker_review,
                &request.finance_review,
                &request.director_review,
            ]
            .iter()
            .filter(|r| r.decision == StageDecision::Rejected)
            .count();
            prop_assert!(rejected_count <= 1);
        }
    }

    /// After a rejection, no sequence of further attempts changes any
    /// decision.
    #[test]
    fn prop_rejection_freezes(
        ops in prop::collection::vec((arb_role(), arb_decision()), 1..8)
    ) {
        let request = new_request();
        let rejected = AidRequestService::review(
            request,
            ActorRole::Caseworker,
            Uuid::new_v4(),
            ReviewDecision::Reject,
            Some("insufficient evidence".to_string()),
        )
        .expect("first decision is valid");

        let mut current = rejected.clone();
        for (role, decision) in ops {
            let notes = matches!(decision, ReviewDecision::Reject)
                .then(|| "prop rejection".to_string());
            if let Ok(updated) = AidRequestService::review(
                current.clone(),
                role,
                Uuid::new_v4(),
                decision,
                notes,
            ) {
                current = updated;
            }
        }

        prop_assert_eq!(current.stage, rejected.stage);
        prop_assert_eq!(current.caseworker_review, rejected.caseworker_review);
        prop_assert_eq!(current.finance_review, rejected.finance_review);
        prop_assert_eq!(current.director_review, rejected.director_review);
    }
}
