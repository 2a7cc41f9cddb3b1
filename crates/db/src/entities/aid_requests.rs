//! `SeaORM` Entity for the aid_requests table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{FundCategory, ReviewStage, StageDecision};

/// An aid request row: one funding request with its three stage
/// decision records.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "aid_requests")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The submitting beneficiary.
    pub beneficiary_id: Uuid,
    /// Facility/unit for scoped queues.
    pub unit_id: Option<Uuid>,
    /// Fund category.
    pub fund_category: FundCategory,
    /// Requested (and, once approved, granted) amount.
    pub amount: Decimal,
    /// Period month (cost-of-living only).
    pub period_month: Option<i16>,
    /// Period year (cost-of-living only).
    pub period_year: Option<i32>,
    /// Free-text purpose.
    pub purpose: String,
    /// Stage cursor.
    pub stage: ReviewStage,
    /// Caseworker stage decision.
    pub caseworker_decision: StageDecision,
    /// Caseworker reviewer.
    pub caseworker_reviewed_by: Option<Uuid>,
    /// When the caseworker decided.
    pub caseworker_reviewed_at: Option<DateTimeWithTimeZone>,
    /// Caseworker notes.
    pub caseworker_notes: Option<String>,
    /// Finance stage decision.
    pub finance_decision: StageDecision,
    /// Finance reviewer.
    pub finance_reviewed_by: Option<Uuid>,
    /// When finance decided.
    pub finance_reviewed_at: Option<DateTimeWithTimeZone>,
    /// Finance notes.
    pub finance_notes: Option<String>,
    /// Director stage decision.
    pub director_decision: StageDecision,
    /// Director reviewer.
    pub director_reviewed_by: Option<Uuid>,
    /// When the director decided.
    pub director_reviewed_at: Option<DateTimeWithTimeZone>,
    /// Director notes.
    pub director_notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The disbursement paying out this request, if created.
    #[sea_orm(has_one = "super::disbursements::Entity")]
    Disbursements,
}

impl Related<super::disbursements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disbursements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
