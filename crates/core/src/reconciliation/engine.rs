//! Ledger recomputation for disbursements.

use chrono::Utc;

use almoner_shared::types::Money;

use crate::disbursement::types::LedgerSnapshot;

/// Stateless engine that derives a disbursement's liquidation totals.
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Recomputes the ledger snapshot from approved liquidation claims.
    ///
    /// * `amount` - the disbursement amount
    /// * `approved_claims` - receipt totals of every `approved`
    ///   liquidation of the disbursement
    /// * `previous` - the stored snapshot, used only to keep the
    ///   original `fully_liquidated_at` once set
    ///
    /// Deterministic and idempotent: the sums are derived from the
    /// claims alone, never incremented, and the liquidated amount is
    /// clamped to the disbursement amount. `fully_liquidated_at` is
    /// stamped only on the false-to-true edge.
    #[must_use]
    pub fn recompute(
        amount: Money,
        approved_claims: &[Money],
        previous: &LedgerSnapshot,
    ) -> LedgerSnapshot {
        let total = approved_claims
            .iter()
            .try_fold(Money::ZERO, |acc, c| acc.checked_add(*c))
            .unwrap_or(amount);

        let liquidated_amount = total.min(amount);
        let remaining_to_liquidate = amount.saturating_sub(liquidated_amount);
        let fully_liquidated = remaining_to_liquidate.is_zero();

        let fully_liquidated_at = if fully_liquidated {
            if previous.fully_liquidated {
                previous.fully_liquidated_at
            } else {
                Some(Utc::now())
            }
        } else {
            None
        };

        LedgerSnapshot {
            liquidated_amount,
            remaining_to_liquidate,
            fully_liquidated,
            fully_liquidated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn money(d: Decimal) -> Money {
        Money::new(d).unwrap()
    }

    #[test]
    fn test_no_liquidations() {
        let amount = money(dec!(1000));
        let snapshot =
            ReconciliationEngine::recompute(amount, &[], &LedgerSnapshot::opening(amount));
        assert_eq!(snapshot.liquidated_amount, Money::ZERO);
        assert_eq!(snapshot.remaining_to_liquidate.amount(), dec!(1000));
        assert!(!snapshot.fully_liquidated);
        assert!(snapshot.fully_liquidated_at.is_none());
    }

    #[test]
    fn test_full_liquidation_sets_timestamp() {
        let amount = money(dec!(1000));
        let snapshot = ReconciliationEngine::recompute(
            amount,
            &[money(dec!(1000))],
            &LedgerSnapshot::opening(amount),
        );
        assert_eq!(snapshot.liquidated_amount.amount(), dec!(1000));
        assert!(snapshot.remaining_to_liquidate.is_zero());
        assert!(snapshot.fully_liquidated);
        assert!(snapshot.fully_liquidated_at.is_some());
    }

    #[test]
    fn test_partial_liquidation() {
        let amount = money(dec!(1000));
        let snapshot = ReconciliationEngine::recompute(
            amount,
            &[money(dec!(600))],
            &LedgerSnapshot::opening(amount),
        );
        assert_eq!(snapshot.liquidated_amount.amount(), dec!(600));
        assert_eq!(snapshot.remaining_to_liquidate.amount(), dec!(400));
        assert!(!snapshot.fully_liquidated);
    }

    #[test]
    fn test_multiple_claims_sum() {
        let amount = money(dec!(1000));
        let snapshot = ReconciliationEngine::recompute(
            amount,
            &[money(dec!(600)), money(dec!(400))],
            &LedgerSnapshot::opening(amount),
        );
        assert_eq!(snapshot.liquidated_amount.amount(), dec!(1000));
        assert!(snapshot.fully_liquidated);
    }

    #[test]
    fn test_clamped_to_amount() {
        // Administrative fix-ups can leave stale rows; the clamp keeps
        // the ledger conserved regardless.
        let amount = money(dec!(1000));
        let snapshot = ReconciliationEngine::recompute(
            amount,
            &[money(dec!(900)), money(dec!(300))],
            &LedgerSnapshot::opening(amount),
        );
        assert_eq!(snapshot.liquidated_amount.amount(), dec!(1000));
        assert!(snapshot.remaining_to_liquidate.is_zero());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let amount = money(dec!(1000));
        let claims = [money(dec!(1000))];
        let first =
            ReconciliationEngine::recompute(amount, &claims, &LedgerSnapshot::opening(amount));
        let second = ReconciliationEngine::recompute(amount, &claims, &first);

        assert_eq!(second.liquidated_amount, first.liquidated_amount);
        assert_eq!(second.remaining_to_liquidate, first.remaining_to_liquidate);
        assert_eq!(second.fully_liquidated, first.fully_liquidated);
        // The original completion timestamp is kept, not restamped.
        assert_eq!(second.fully_liquidated_at, first.fully_liquidated_at);
    }

    #[test]
    fn test_repair_clears_stale_completion() {
        // A fully-liquidated disbursement whose only liquidation was
        // administratively removed must drop back to not-complete.
        let amount = money(dec!(1000));
        let stale = ReconciliationEngine::recompute(
            amount,
            &[money(dec!(1000))],
            &LedgerSnapshot::opening(amount),
        );

        let repaired = ReconciliationEngine::recompute(amount, &[], &stale);
        assert_eq!(repaired.liquidated_amount, Money::ZERO);
        assert_eq!(repaired.remaining_to_liquidate.amount(), dec!(1000));
        assert!(!repaired.fully_liquidated);
        assert!(repaired.fully_liquidated_at.is_none());
    }
}
