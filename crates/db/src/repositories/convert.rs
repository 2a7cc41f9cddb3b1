//! Conversions between `SeaORM` models and core domain types.
//!
//! Reads can fail only on corrupt rows (negative amounts, impossible
//! periods); those surface as `String` messages the repositories wrap
//! in their own database-error variants.

use chrono::Utc;
use sea_orm::Set;

use almoner_core::aid_request::types::{
    AidRequest, FundCategory, Period, ReviewStage, StageDecision, StageReview,
};
use almoner_core::disbursement::types::{Disbursement, DisbursementStatus, LedgerSnapshot};
use almoner_core::liquidation::types::{
    ApprovalLevel, LevelReview, Liquidation, LiquidationStatus, Receipt, VerificationStatus,
};
use almoner_shared::types::Money;

use crate::entities::{aid_requests, disbursements, liquidations, receipts, sea_orm_active_enums};

pub(crate) fn money(value: rust_decimal::Decimal, field: &str) -> Result<Money, String> {
    Money::new(value).ok_or_else(|| format!("negative amount in column {field}"))
}

// ============================================================================
// Enum mappings
// ============================================================================

pub(crate) fn category_to_core(c: &sea_orm_active_enums::FundCategory) -> FundCategory {
    match c {
        sea_orm_active_enums::FundCategory::Tuition => FundCategory::Tuition,
        sea_orm_active_enums::FundCategory::CostOfLiving => FundCategory::CostOfLiving,
        sea_orm_active_enums::FundCategory::Other => FundCategory::Other,
    }
}

pub(crate) fn category_to_db(c: FundCategory) -> sea_orm_active_enums::FundCategory {
    match c {
        FundCategory::Tuition => sea_orm_active_enums::FundCategory::Tuition,
        FundCategory::CostOfLiving => sea_orm_active_enums::FundCategory::CostOfLiving,
        FundCategory::Other => sea_orm_active_enums::FundCategory::Other,
    }
}

pub(crate) fn stage_to_core(s: &sea_orm_active_enums::ReviewStage) -> ReviewStage {
    match s {
        sea_orm_active_enums::ReviewStage::Caseworker => ReviewStage::Caseworker,
        sea_orm_active_enums::ReviewStage::Finance => ReviewStage::Finance,
        sea_orm_active_enums::ReviewStage::Director => ReviewStage::Director,
        sea_orm_active_enums::ReviewStage::Done => ReviewStage::Done,
    }
}

pub(crate) fn stage_to_db(s: ReviewStage) -> sea_orm_active_enums::ReviewStage {
    match s {
        ReviewStage::Caseworker => sea_orm_active_enums::ReviewStage::Caseworker,
        ReviewStage::Finance => sea_orm_active_enums::ReviewStage::Finance,
        ReviewStage::Director => sea_orm_active_enums::ReviewStage::Director,
        ReviewStage::Done => sea_orm_active_enums::ReviewStage::Done,
    }
}

pub(crate) fn decision_to_core(d: &sea_orm_active_enums::StageDecision) -> StageDecision {
    match d {
        sea_orm_active_enums::StageDecision::Pending => StageDecision::Pending,
        sea_orm_active_enums::StageDecision::Approved => StageDecision::Approved,
        sea_orm_active_enums::StageDecision::Rejected => StageDecision::Rejected,
    }
}

pub(crate) fn decision_to_db(d: StageDecision) -> sea_orm_active_enums::StageDecision {
    match d {
        StageDecision::Pending => sea_orm_active_enums::StageDecision::Pending,
        StageDecision::Approved => sea_orm_active_enums::StageDecision::Approved,
        StageDecision::Rejected => sea_orm_active_enums::StageDecision::Rejected,
    }
}

pub(crate) fn disb_status_to_core(
    s: &sea_orm_active_enums::DisbursementStatus,
) -> DisbursementStatus {
    match s {
        sea_orm_active_enums::DisbursementStatus::Pending => DisbursementStatus::Pending,
        sea_orm_active_enums::DisbursementStatus::FinanceDisbursed => {
            DisbursementStatus::FinanceDisbursed
        }
        sea_orm_active_enums::DisbursementStatus::CaseworkerReceived => {
            DisbursementStatus::CaseworkerReceived
        }
        sea_orm_active_enums::DisbursementStatus::CaseworkerDisbursed => {
            DisbursementStatus::CaseworkerDisbursed
        }
        sea_orm_active_enums::DisbursementStatus::BeneficiaryReceived => {
            DisbursementStatus::BeneficiaryReceived
        }
    }
}

pub(crate) fn disb_status_to_db(
    s: DisbursementStatus,
) -> sea_orm_active_enums::DisbursementStatus {
    match s {
        DisbursementStatus::Pending => sea_orm_active_enums::DisbursementStatus::Pending,
        DisbursementStatus::FinanceDisbursed => {
            sea_orm_active_enums::DisbursementStatus::FinanceDisbursed
        }
        DisbursementStatus::CaseworkerReceived => {
            sea_orm_active_enums::DisbursementStatus::CaseworkerReceived
        }
        DisbursementStatus::CaseworkerDisbursed => {
            sea_orm_active_enums::DisbursementStatus::CaseworkerDisbursed
        }
        DisbursementStatus::BeneficiaryReceived => {
            sea_orm_active_enums::DisbursementStatus::BeneficiaryReceived
        }
    }
}

pub(crate) fn liq_status_to_core(
    s: &sea_orm_active_enums::LiquidationStatus,
) -> LiquidationStatus {
    match s {
        sea_orm_active_enums::LiquidationStatus::Pending => LiquidationStatus::Pending,
        sea_orm_active_enums::LiquidationStatus::InProgress => LiquidationStatus::InProgress,
        sea_orm_active_enums::LiquidationStatus::Complete => LiquidationStatus::Complete,
        sea_orm_active_enums::LiquidationStatus::PendingCaseworkerApproval => {
            LiquidationStatus::PendingCaseworkerApproval
        }
        sea_orm_active_enums::LiquidationStatus::PendingFinanceApproval => {
            LiquidationStatus::PendingFinanceApproval
        }
        sea_orm_active_enums::LiquidationStatus::PendingDirectorApproval => {
            LiquidationStatus::PendingDirectorApproval
        }
        sea_orm_active_enums::LiquidationStatus::Approved => LiquidationStatus::Approved,
        sea_orm_active_enums::LiquidationStatus::Rejected => LiquidationStatus::Rejected,
    }
}

pub(crate) fn liq_status_to_db(
    s: LiquidationStatus,
) -> sea_orm_active_enums::LiquidationStatus {
    match s {
        LiquidationStatus::Pending => sea_orm_active_enums::LiquidationStatus::Pending,
        LiquidationStatus::InProgress => sea_orm_active_enums::LiquidationStatus::InProgress,
        LiquidationStatus::Complete => sea_orm_active_enums::LiquidationStatus::Complete,
        LiquidationStatus::PendingCaseworkerApproval => {
            sea_orm_active_enums::LiquidationStatus::PendingCaseworkerApproval
        }
        LiquidationStatus::PendingFinanceApproval => {
            sea_orm_active_enums::LiquidationStatus::PendingFinanceApproval
        }
        LiquidationStatus::PendingDirectorApproval => {
            sea_orm_active_enums::LiquidationStatus::PendingDirectorApproval
        }
        LiquidationStatus::Approved => sea_orm_active_enums::LiquidationStatus::Approved,
        LiquidationStatus::Rejected => sea_orm_active_enums::LiquidationStatus::Rejected,
    }
}

pub(crate) fn level_to_core(l: &sea_orm_active_enums::ApprovalLevel) -> ApprovalLevel {
    match l {
        sea_orm_active_enums::ApprovalLevel::Caseworker => ApprovalLevel::Caseworker,
        sea_orm_active_enums::ApprovalLevel::Finance => ApprovalLevel::Finance,
        sea_orm_active_enums::ApprovalLevel::Director => ApprovalLevel::Director,
    }
}

pub(crate) fn level_to_db(l: ApprovalLevel) -> sea_orm_active_enums::ApprovalLevel {
    match l {
        ApprovalLevel::Caseworker => sea_orm_active_enums::ApprovalLevel::Caseworker,
        ApprovalLevel::Finance => sea_orm_active_enums::ApprovalLevel::Finance,
        ApprovalLevel::Director => sea_orm_active_enums::ApprovalLevel::Director,
    }
}

pub(crate) fn verification_to_core(
    v: &sea_orm_active_enums::VerificationStatus,
) -> VerificationStatus {
    match v {
        sea_orm_active_enums::VerificationStatus::Pending => VerificationStatus::Pending,
        sea_orm_active_enums::VerificationStatus::Verified => VerificationStatus::Verified,
        sea_orm_active_enums::VerificationStatus::Questioned => VerificationStatus::Questioned,
    }
}

pub(crate) fn verification_to_db(
    v: VerificationStatus,
) -> sea_orm_active_enums::VerificationStatus {
    match v {
        VerificationStatus::Pending => sea_orm_active_enums::VerificationStatus::Pending,
        VerificationStatus::Verified => sea_orm_active_enums::VerificationStatus::Verified,
        VerificationStatus::Questioned => sea_orm_active_enums::VerificationStatus::Questioned,
    }
}

// ============================================================================
// Aid requests
// ============================================================================

pub(crate) fn aid_request_to_core(model: &aid_requests::Model) -> Result<AidRequest, String> {
    let period = match (model.period_month, model.period_year) {
        (Some(month), Some(year)) => {
            let month = u8::try_from(month).map_err(|_| "period_month out of range".to_string())?;
            Some(Period::new(month, year).ok_or_else(|| "period_month out of range".to_string())?)
        }
        _ => None,
    };

    Ok(AidRequest {
        id: model.id,
        beneficiary_id: model.beneficiary_id,
        unit_id: model.unit_id,
        category: category_to_core(&model.fund_category),
        amount: money(model.amount, "amount")?,
        period,
        purpose: model.purpose.clone(),
        stage: stage_to_core(&model.stage),
        caseworker_review: StageReview {
            decision: decision_to_core(&model.caseworker_decision),
            reviewer: model.caseworker_reviewed_by,
            decided_at: model.caseworker_reviewed_at.map(|t| t.with_timezone(&Utc)),
            notes: model.caseworker_notes.clone(),
        },
        finance_review: StageReview {
            decision: decision_to_core(&model.finance_decision),
            reviewer: model.finance_reviewed_by,
            decided_at: model.finance_reviewed_at.map(|t| t.with_timezone(&Utc)),
            notes: model.finance_notes.clone(),
        },
        director_review: StageReview {
            decision: decision_to_core(&model.director_decision),
            reviewer: model.director_reviewed_by,
            decided_at: model.director_reviewed_at.map(|t| t.with_timezone(&Utc)),
            notes: model.director_notes.clone(),
        },
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn aid_request_to_active(request: &AidRequest) -> aid_requests::ActiveModel {
    aid_requests::ActiveModel {
        id: Set(request.id),
        beneficiary_id: Set(request.beneficiary_id),
        unit_id: Set(request.unit_id),
        fund_category: Set(category_to_db(request.category)),
        amount: Set(request.amount.amount()),
        period_month: Set(request.period.map(|p| i16::from(p.month))),
        period_year: Set(request.period.map(|p| p.year)),
        purpose: Set(request.purpose.clone()),
        stage: Set(stage_to_db(request.stage)),
        caseworker_decision: Set(decision_to_db(request.caseworker_review.decision)),
        caseworker_reviewed_by: Set(request.caseworker_review.reviewer),
        caseworker_reviewed_at: Set(request.caseworker_review.decided_at.map(Into::into)),
        caseworker_notes: Set(request.caseworker_review.notes.clone()),
        finance_decision: Set(decision_to_db(request.finance_review.decision)),
        finance_reviewed_by: Set(request.finance_review.reviewer),
        finance_reviewed_at: Set(request.finance_review.decided_at.map(Into::into)),
        finance_notes: Set(request.finance_review.notes.clone()),
        director_decision: Set(decision_to_db(request.director_review.decision)),
        director_reviewed_by: Set(request.director_review.reviewer),
        director_reviewed_at: Set(request.director_review.decided_at.map(Into::into)),
        director_notes: Set(request.director_review.notes.clone()),
        created_at: Set(request.created_at.into()),
        updated_at: Set(request.updated_at.into()),
    }
}

// ============================================================================
// Disbursements
// ============================================================================

pub(crate) fn disbursement_to_core(
    model: &disbursements::Model,
) -> Result<Disbursement, String> {
    Ok(Disbursement {
        id: model.id,
        aid_request_id: model.aid_request_id,
        beneficiary_id: model.beneficiary_id,
        amount: money(model.amount, "amount")?,
        status: disb_status_to_core(&model.status),
        reference_number: model.reference_number.clone(),
        notes: model.notes.clone(),
        finance_disbursed_by: model.finance_disbursed_by,
        finance_disbursed_at: model.finance_disbursed_at.map(|t| t.with_timezone(&Utc)),
        caseworker_received_by: model.caseworker_received_by,
        caseworker_received_at: model.caseworker_received_at.map(|t| t.with_timezone(&Utc)),
        caseworker_disbursed_by: model.caseworker_disbursed_by,
        caseworker_disbursed_at: model.caseworker_disbursed_at.map(|t| t.with_timezone(&Utc)),
        beneficiary_received_by: model.beneficiary_received_by,
        beneficiary_received_at: model.beneficiary_received_at.map(|t| t.with_timezone(&Utc)),
        ledger: LedgerSnapshot {
            liquidated_amount: money(model.liquidated_amount, "liquidated_amount")?,
            remaining_to_liquidate: money(model.remaining_to_liquidate, "remaining_to_liquidate")?,
            fully_liquidated: model.fully_liquidated,
            fully_liquidated_at: model.fully_liquidated_at.map(|t| t.with_timezone(&Utc)),
        },
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn disbursement_to_active(
    disbursement: &Disbursement,
) -> disbursements::ActiveModel {
    disbursements::ActiveModel {
        id: Set(disbursement.id),
        aid_request_id: Set(disbursement.aid_request_id),
        beneficiary_id: Set(disbursement.beneficiary_id),
        amount: Set(disbursement.amount.amount()),
        status: Set(disb_status_to_db(disbursement.status)),
        reference_number: Set(disbursement.reference_number.clone()),
        notes: Set(disbursement.notes.clone()),
        finance_disbursed_by: Set(disbursement.finance_disbursed_by),
        finance_disbursed_at: Set(disbursement.finance_disbursed_at.map(Into::into)),
        caseworker_received_by: Set(disbursement.caseworker_received_by),
        caseworker_received_at: Set(disbursement.caseworker_received_at.map(Into::into)),
        caseworker_disbursed_by: Set(disbursement.caseworker_disbursed_by),
        caseworker_disbursed_at: Set(disbursement.caseworker_disbursed_at.map(Into::into)),
        beneficiary_received_by: Set(disbursement.beneficiary_received_by),
        beneficiary_received_at: Set(disbursement.beneficiary_received_at.map(Into::into)),
        liquidated_amount: Set(disbursement.ledger.liquidated_amount.amount()),
        remaining_to_liquidate: Set(disbursement.ledger.remaining_to_liquidate.amount()),
        fully_liquidated: Set(disbursement.ledger.fully_liquidated),
        fully_liquidated_at: Set(disbursement.ledger.fully_liquidated_at.map(Into::into)),
        created_at: Set(disbursement.created_at.into()),
        updated_at: Set(disbursement.updated_at.into()),
    }
}

// ============================================================================
// Liquidations and receipts
// ============================================================================

pub(crate) fn receipt_to_core(model: &receipts::Model) -> Result<Receipt, String> {
    Ok(Receipt {
        id: model.id,
        liquidation_id: model.liquidation_id,
        amount: money(model.amount, "amount")?,
        receipt_number: model.receipt_number.clone(),
        receipt_date: model.receipt_date,
        description: model.description.clone(),
        file_ref: model.file_ref.clone(),
        verification_status: verification_to_core(&model.verification_status),
        verification_notes: model.verification_notes.clone(),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub(crate) fn liquidation_to_core(
    model: &liquidations::Model,
    receipt_rows: &[receipts::Model],
) -> Result<Liquidation, String> {
    let receipts = receipt_rows
        .iter()
        .map(receipt_to_core)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Liquidation {
        id: model.id,
        disbursement_id: model.disbursement_id,
        beneficiary_id: model.beneficiary_id,
        category: category_to_core(&model.fund_category),
        claimed_amount: money(model.claimed_amount, "claimed_amount")?,
        receipt_total: money(model.receipt_total, "receipt_total")?,
        remaining_amount: money(model.remaining_amount, "remaining_amount")?,
        is_complete: model.is_complete,
        status: liq_status_to_core(&model.status),
        caseworker_review: LevelReview {
            approver: model.caseworker_approved_by,
            decided_at: model.caseworker_approved_at.map(|t| t.with_timezone(&Utc)),
            notes: model.caseworker_notes.clone(),
        },
        finance_review: LevelReview {
            approver: model.finance_approved_by,
            decided_at: model.finance_approved_at.map(|t| t.with_timezone(&Utc)),
            notes: model.finance_notes.clone(),
        },
        director_review: LevelReview {
            approver: model.director_approved_by,
            decided_at: model.director_approved_at.map(|t| t.with_timezone(&Utc)),
            notes: model.director_notes.clone(),
        },
        rejected_at_level: model.rejected_at_level.as_ref().map(level_to_core),
        rejection_reason: model.rejection_reason.clone(),
        receipts,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn liquidation_to_active(liquidation: &Liquidation) -> liquidations::ActiveModel {
    liquidations::ActiveModel {
        id: Set(liquidation.id),
        disbursement_id: Set(liquidation.disbursement_id),
        beneficiary_id: Set(liquidation.beneficiary_id),
        fund_category: Set(category_to_db(liquidation.category)),
        claimed_amount: Set(liquidation.claimed_amount.amount()),
        receipt_total: Set(liquidation.receipt_total.amount()),
        remaining_amount: Set(liquidation.remaining_amount.amount()),
        is_complete: Set(liquidation.is_complete),
        status: Set(liq_status_to_db(liquidation.status)),
        caseworker_approved_by: Set(liquidation.caseworker_review.approver),
        caseworker_approved_at: Set(liquidation.caseworker_review.decided_at.map(Into::into)),
        caseworker_notes: Set(liquidation.caseworker_review.notes.clone()),
        finance_approved_by: Set(liquidation.finance_review.approver),
        finance_approved_at: Set(liquidation.finance_review.decided_at.map(Into::into)),
        finance_notes: Set(liquidation.finance_review.notes.clone()),
        director_approved_by: Set(liquidation.director_review.approver),
        director_approved_at: Set(liquidation.director_review.decided_at.map(Into::into)),
        director_notes: Set(liquidation.director_review.notes.clone()),
        rejected_at_level: Set(liquidation.rejected_at_level.map(level_to_db)),
        rejection_reason: Set(liquidation.rejection_reason.clone()),
        created_at: Set(liquidation.created_at.into()),
        updated_at: Set(liquidation.updated_at.into()),
    }
}

pub(crate) fn receipt_to_active(receipt: &Receipt) -> receipts::ActiveModel {
    receipts::ActiveModel {
        id: Set(receipt.id),
        liquidation_id: Set(receipt.liquidation_id),
        amount: Set(receipt.amount.amount()),
        receipt_number: Set(receipt.receipt_number.clone()),
        receipt_date: Set(receipt.receipt_date),
        description: Set(receipt.description.clone()),
        file_ref: Set(receipt.file_ref.clone()),
        verification_status: Set(verification_to_db(receipt.verification_status)),
        verification_notes: Set(receipt.verification_notes.clone()),
        created_at: Set(receipt.created_at.into()),
    }
}
