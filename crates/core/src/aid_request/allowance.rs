//! Attendance-derived allowance calculation.
//!
//! Cost-of-living amounts are always re-derived from the attendance
//! provider's source data (attended days x per-day rate), never
//! accumulated, so recalculation is idempotent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use almoner_shared::types::Money;

/// Attendance data for one beneficiary and period, as reported by the
/// external attendance provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Number of days attended in the period.
    pub attended_days: u32,
    /// Allowance rate per attended day.
    pub daily_rate: Money,
}

impl AttendanceSummary {
    /// The allowance amount for this attendance: days x rate.
    ///
    /// Returns `None` only on decimal overflow.
    #[must_use]
    pub fn allowance_amount(&self) -> Option<Money> {
        let amount = Decimal::from(self.attended_days).checked_mul(self.daily_rate.amount())?;
        Money::new(amount)
    }
}
