//! `SeaORM` Entity for the disbursements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::DisbursementStatus;

/// A disbursement row: one funds handoff tied 1:1 to an aid request,
/// with the derived liquidation ledger fields.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "disbursements")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The fully-approved aid request being paid out (unique).
    pub aid_request_id: Uuid,
    /// The receiving beneficiary.
    pub beneficiary_id: Uuid,
    /// Amount, equal to the request's approved amount.
    pub amount: Decimal,
    /// Current handoff status.
    pub status: DisbursementStatus,
    /// Handoff paperwork reference.
    pub reference_number: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Finance actor of the release.
    pub finance_disbursed_by: Option<Uuid>,
    /// When finance released the funds.
    pub finance_disbursed_at: Option<DateTimeWithTimeZone>,
    /// Caseworker who received the funds.
    pub caseworker_received_by: Option<Uuid>,
    /// When the caseworker received the funds.
    pub caseworker_received_at: Option<DateTimeWithTimeZone>,
    /// Caseworker who handed the funds over.
    pub caseworker_disbursed_by: Option<Uuid>,
    /// When the caseworker handed the funds over.
    pub caseworker_disbursed_at: Option<DateTimeWithTimeZone>,
    /// Beneficiary who confirmed receipt.
    pub beneficiary_received_by: Option<Uuid>,
    /// When the beneficiary confirmed receipt.
    pub beneficiary_received_at: Option<DateTimeWithTimeZone>,
    /// Derived: sum of approved liquidation claims, clamped.
    pub liquidated_amount: Decimal,
    /// Derived: amount minus liquidated, floored at zero.
    pub remaining_to_liquidate: Decimal,
    /// Derived: true when nothing remains to liquidate.
    pub fully_liquidated: bool,
    /// Derived: when the disbursement first became fully liquidated.
    pub fully_liquidated_at: Option<DateTimeWithTimeZone>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The aid request this disbursement pays out.
    #[sea_orm(
        belongs_to = "super::aid_requests::Entity",
        from = "Column::AidRequestId",
        to = "super::aid_requests::Column::Id"
    )]
    AidRequests,
    /// Liquidations accounting for this disbursement.
    #[sea_orm(has_many = "super::liquidations::Entity")]
    Liquidations,
}

impl Related<super::aid_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AidRequests.def()
    }
}

impl Related<super::liquidations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Liquidations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
