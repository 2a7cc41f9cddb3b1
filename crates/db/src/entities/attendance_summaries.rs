//! `SeaORM` Entity for the attendance_summaries table.
//!
//! Written by the external attendance system; this service only reads
//! it through the `AttendanceProvider` port.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance data for one beneficiary and period.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_summaries")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The beneficiary the attendance belongs to.
    pub beneficiary_id: Uuid,
    /// Period month.
    pub period_month: i16,
    /// Period year.
    pub period_year: i32,
    /// Days attended in the period.
    pub attended_days: i32,
    /// Allowance rate per attended day.
    pub daily_rate: Decimal,
    /// Last sync from the attendance system.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
