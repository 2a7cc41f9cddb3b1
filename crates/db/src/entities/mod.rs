//! `SeaORM` entity definitions.

pub mod aid_requests;
pub mod attendance_summaries;
pub mod disbursements;
pub mod liquidations;
pub mod receipts;
pub mod sea_orm_active_enums;
