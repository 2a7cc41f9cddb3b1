//! Money type with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.
//!
//! Ledger arithmetic used by the disbursement reconciliation lives here:
//! amounts are never negative, and subtraction floors at zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a non-negative monetary amount.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
/// All aid amounts are denominated in the single facility currency, so
/// no currency code is carried.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new amount, rejecting negative values.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        if amount.is_sign_negative() {
            None
        } else {
            Some(Self(amount))
        }
    }

    /// Returns the inner decimal value.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Subtracts `other`, flooring at zero.
    ///
    /// This is the clamp rule for remaining-to-liquidate amounts: an
    /// over-covered disbursement reports zero remaining, never a
    /// negative number.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Returns the smaller of the two amounts.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_new_rejects_negative() {
        assert!(Money::new(dec!(-0.01)).is_none());
        assert!(Money::new(dec!(0)).is_some());
        assert!(Money::new(dec!(100.50)).is_some());
    }

    #[test]
    fn test_money_zero() {
        assert!(Money::ZERO.is_zero());
        assert_eq!(Money::ZERO.amount(), Decimal::ZERO);
    }

    #[test]
    fn test_checked_add() {
        let a = Money::new(dec!(600)).unwrap();
        let b = Money::new(dec!(500)).unwrap();
        assert_eq!(a.checked_add(b).unwrap().amount(), dec!(1100));
    }

    #[rstest]
    #[case(dec!(1000), dec!(600), dec!(400))]
    #[case(dec!(1000), dec!(1000), dec!(0))]
    #[case(dec!(1000), dec!(1200), dec!(0))]
    #[case(dec!(0), dec!(1), dec!(0))]
    fn test_saturating_sub(
        #[case] amount: Decimal,
        #[case] claimed: Decimal,
        #[case] expected: Decimal,
    ) {
        let amount = Money::new(amount).unwrap();
        let claimed = Money::new(claimed).unwrap();
        assert_eq!(amount.saturating_sub(claimed).amount(), expected);
    }

    #[test]
    fn test_min() {
        let a = Money::new(dec!(1000)).unwrap();
        let b = Money::new(dec!(1200)).unwrap();
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }

    #[test]
    fn test_ordering() {
        let small = Money::new(dec!(1)).unwrap();
        let big = Money::new(dec!(2)).unwrap();
        assert!(small < big);
    }
}
