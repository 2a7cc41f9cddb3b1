//! `SeaORM` active enums mapping to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fund category of an aid request.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fund_category")]
pub enum FundCategory {
    /// Tuition assistance.
    #[sea_orm(string_value = "tuition")]
    Tuition,
    /// Attendance-derived monthly allowance.
    #[sea_orm(string_value = "cost_of_living")]
    CostOfLiving,
    /// Any other aid purpose.
    #[sea_orm(string_value = "other")]
    Other,
}

/// Stage cursor of an aid request.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "review_stage")]
pub enum ReviewStage {
    /// Awaiting the caseworker decision.
    #[sea_orm(string_value = "caseworker")]
    Caseworker,
    /// Awaiting the finance decision.
    #[sea_orm(string_value = "finance")]
    Finance,
    /// Awaiting the director decision.
    #[sea_orm(string_value = "director")]
    Director,
    /// All three stages approved.
    #[sea_orm(string_value = "done")]
    Done,
}

/// Decision recorded at a review stage.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "stage_decision")]
pub enum StageDecision {
    /// No decision yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Stage approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Stage rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Status of a disbursement handoff.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "disbursement_status")]
pub enum DisbursementStatus {
    /// Created; finance has not yet released funds.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Finance released the funds.
    #[sea_orm(string_value = "finance_disbursed")]
    FinanceDisbursed,
    /// The caseworker received the funds.
    #[sea_orm(string_value = "caseworker_received")]
    CaseworkerReceived,
    /// The caseworker handed the funds over.
    #[sea_orm(string_value = "caseworker_disbursed")]
    CaseworkerDisbursed,
    /// The beneficiary confirmed receipt.
    #[sea_orm(string_value = "beneficiary_received")]
    BeneficiaryReceived,
}

/// Status of a liquidation.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "liquidation_status")]
pub enum LiquidationStatus {
    /// Created; no receipts yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Receipts attached but not fully covering the claim.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Receipts fully cover the claim.
    #[sea_orm(string_value = "complete")]
    Complete,
    /// Awaiting the caseworker decision.
    #[sea_orm(string_value = "pending_caseworker_approval")]
    PendingCaseworkerApproval,
    /// Awaiting the finance decision.
    #[sea_orm(string_value = "pending_finance_approval")]
    PendingFinanceApproval,
    /// Awaiting the director decision.
    #[sea_orm(string_value = "pending_director_approval")]
    PendingDirectorApproval,
    /// Approved at all three levels.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected; terminal.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Approval level in the liquidation chain.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_level")]
pub enum ApprovalLevel {
    /// First level.
    #[sea_orm(string_value = "caseworker")]
    Caseworker,
    /// Second level.
    #[sea_orm(string_value = "finance")]
    Finance,
    /// Final level.
    #[sea_orm(string_value = "director")]
    Director,
}

/// Verification state of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "verification_status")]
pub enum VerificationStatus {
    /// Not yet examined.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Examined and accepted.
    #[sea_orm(string_value = "verified")]
    Verified,
    /// Examined and flagged.
    #[sea_orm(string_value = "questioned")]
    Questioned,
}
