//! Attendance provider backed by the synced attendance_summaries table.
//!
//! The external attendance system writes the table; this provider only
//! reads it, satisfying the `AttendanceProvider` port for the
//! recalculation job.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use almoner_core::aid_request::allowance::AttendanceSummary;
use almoner_core::aid_request::types::Period;
use almoner_core::ports::{AttendanceError, AttendanceProvider};
use almoner_shared::types::Money;

use crate::entities::attendance_summaries;

/// Reads attendance summaries from the database mirror.
#[derive(Debug, Clone)]
pub struct SqlAttendanceProvider {
    db: DatabaseConnection,
}

impl SqlAttendanceProvider {
    /// Creates a new provider over the shared connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AttendanceProvider for SqlAttendanceProvider {
    async fn attendance(
        &self,
        beneficiary_id: Uuid,
        period: Period,
    ) -> Result<Option<AttendanceSummary>, AttendanceError> {
        let row = attendance_summaries::Entity::find()
            .filter(attendance_summaries::Column::BeneficiaryId.eq(beneficiary_id))
            .filter(attendance_summaries::Column::PeriodYear.eq(period.year))
            .filter(attendance_summaries::Column::PeriodMonth.eq(i16::from(period.month)))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let attended_days = u32::try_from(row.attended_days)
            .map_err(|_| AttendanceError(format!("negative attended_days for {beneficiary_id}")))?;
        let daily_rate = Money::new(row.daily_rate)
            .ok_or_else(|| AttendanceError(format!("negative daily_rate for {beneficiary_id}")))?;

        Ok(Some(AttendanceSummary {
            attended_days,
            daily_rate,
        }))
    }
}
