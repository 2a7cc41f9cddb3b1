//! Attendance/allowance provider port.

use thiserror::Error;
use uuid::Uuid;

use crate::aid_request::allowance::AttendanceSummary;
use crate::aid_request::types::Period;

/// Error returned by an attendance provider.
#[derive(Debug, Error)]
#[error("Attendance provider error: {0}")]
pub struct AttendanceError(pub String);

/// Supplies attended-day counts and per-day rates.
///
/// Consumed only by the allowance recalculation; the provider is the
/// sole source of truth for attendance data.
pub trait AttendanceProvider: Send + Sync {
    /// Returns the attendance summary for a beneficiary and period,
    /// or `None` when the provider has no data for that period.
    fn attendance(
        &self,
        beneficiary_id: Uuid,
        period: Period,
    ) -> impl std::future::Future<Output = Result<Option<AttendanceSummary>, AttendanceError>> + Send;
}
