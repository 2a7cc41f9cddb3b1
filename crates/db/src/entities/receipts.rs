//! `SeaORM` Entity for the receipts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VerificationStatus;

/// A receipt row: one piece of expense evidence owned by a liquidation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning liquidation.
    pub liquidation_id: Uuid,
    /// Receipt amount.
    pub amount: Decimal,
    /// Vendor receipt number.
    pub receipt_number: String,
    /// Date on the receipt.
    pub receipt_date: Date,
    /// Free-text description.
    pub description: Option<String>,
    /// Opaque reference into the external file store.
    pub file_ref: Option<String>,
    /// Reviewer verification state.
    pub verification_status: VerificationStatus,
    /// Reviewer notes.
    pub verification_notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning liquidation.
    #[sea_orm(
        belongs_to = "super::liquidations::Entity",
        from = "Column::LiquidationId",
        to = "super::liquidations::Column::Id"
    )]
    Liquidations,
}

impl Related<super::liquidations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Liquidations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
