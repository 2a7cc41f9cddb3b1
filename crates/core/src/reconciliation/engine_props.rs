//! Property-based tests for the reconciliation engine.
//!
//! Validates ledger conservation and idempotence under arbitrary
//! approved-claim sets.

use proptest::prelude::*;
use rust_decimal::Decimal;

use almoner_shared::types::Money;

use crate::disbursement::types::LedgerSnapshot;
use crate::reconciliation::engine::ReconciliationEngine;

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_claims() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((0i64..500_000i64).prop_map(|n| Decimal::new(n, 2)), 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Conservation: liquidated + remaining == amount, and liquidated
    /// never exceeds either the amount or the claim sum.
    #[test]
    fn prop_ledger_conservation(amount in arb_amount(), claims in arb_claims()) {
        let amount = Money::new(amount).unwrap();
        let claims: Vec<Money> = claims.into_iter().map(|c| Money::new(c).unwrap()).collect();

        let snapshot =
            ReconciliationEngine::recompute(amount, &claims, &LedgerSnapshot::opening(amount));

        prop_assert_eq!(
            snapshot.liquidated_amount.amount() + snapshot.remaining_to_liquidate.amount(),
            amount.amount()
        );
        prop_assert!(snapshot.liquidated_amount <= amount);

        let claim_sum: Decimal = claims.iter().map(|c| c.amount()).sum();
        prop_assert!(snapshot.liquidated_amount.amount() <= claim_sum || claims.is_empty());
        prop_assert_eq!(
            snapshot.fully_liquidated,
            snapshot.remaining_to_liquidate.is_zero()
        );
    }

    /// Idempotence: recomputing against the engine's own output with
    /// unchanged claims reproduces every derived field.
    #[test]
    fn prop_recompute_idempotent(amount in arb_amount(), claims in arb_claims()) {
        let amount = Money::new(amount).unwrap();
        let claims: Vec<Money> = claims.into_iter().map(|c| Money::new(c).unwrap()).collect();

        let first =
            ReconciliationEngine::recompute(amount, &claims, &LedgerSnapshot::opening(amount));
        let second = ReconciliationEngine::recompute(amount, &claims, &first);

        prop_assert_eq!(second, first);
    }

    /// Claim order never matters.
    #[test]
    fn prop_claim_order_irrelevant(amount in arb_amount(), claims in arb_claims()) {
        let amount = Money::new(amount).unwrap();
        let claims: Vec<Money> = claims.into_iter().map(|c| Money::new(c).unwrap()).collect();
        let mut reversed = claims.clone();
        reversed.reverse();

        let forward =
            ReconciliationEngine::recompute(amount, &claims, &LedgerSnapshot::opening(amount));
        let backward =
            ReconciliationEngine::recompute(amount, &reversed, &LedgerSnapshot::opening(amount));

        prop_assert_eq!(forward.liquidated_amount, backward.liquidated_amount);
        prop_assert_eq!(forward.remaining_to_liquidate, backward.remaining_to_liquidate);
        prop_assert_eq!(forward.fully_liquidated, backward.fully_liquidated);
    }
}
