//! `SeaORM` Entity for the liquidations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ApprovalLevel, FundCategory, LiquidationStatus};

/// A liquidation row: one claim that part of a disbursement was spent,
/// with the three level decision records.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "liquidations")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Parent disbursement.
    pub disbursement_id: Uuid,
    /// The beneficiary accounting for the funds.
    pub beneficiary_id: Uuid,
    /// Fund category, copied for display.
    pub fund_category: FundCategory,
    /// The claimed spent amount.
    pub claimed_amount: Decimal,
    /// Sum of attached receipt amounts.
    pub receipt_total: Decimal,
    /// Claimed minus receipts, floored at zero.
    pub remaining_amount: Decimal,
    /// True when the receipts fully cover the claim.
    pub is_complete: bool,
    /// Current status.
    pub status: LiquidationStatus,
    /// Caseworker-level approver.
    pub caseworker_approved_by: Option<Uuid>,
    /// When the caseworker decided.
    pub caseworker_approved_at: Option<DateTimeWithTimeZone>,
    /// Caseworker notes.
    pub caseworker_notes: Option<String>,
    /// Finance-level approver.
    pub finance_approved_by: Option<Uuid>,
    /// When finance decided.
    pub finance_approved_at: Option<DateTimeWithTimeZone>,
    /// Finance notes.
    pub finance_notes: Option<String>,
    /// Director-level approver.
    pub director_approved_by: Option<Uuid>,
    /// When the director decided.
    pub director_approved_at: Option<DateTimeWithTimeZone>,
    /// Director notes.
    pub director_notes: Option<String>,
    /// Level at which the liquidation was rejected.
    pub rejected_at_level: Option<ApprovalLevel>,
    /// Why the liquidation was rejected.
    pub rejection_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The disbursement being accounted for.
    #[sea_orm(
        belongs_to = "super::disbursements::Entity",
        from = "Column::DisbursementId",
        to = "super::disbursements::Column::Id"
    )]
    Disbursements,
    /// Receipts substantiating this liquidation.
    #[sea_orm(has_many = "super::receipts::Entity")]
    Receipts,
}

impl Related<super::disbursements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disbursements.def()
    }
}

impl Related<super::receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
