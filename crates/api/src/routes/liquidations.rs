//! Liquidation routes: claims, receipts, submission, and the approval
//! chain.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use almoner_core::liquidation::service::AttachReceiptInput;
use almoner_core::liquidation::types::{ApprovalLevel, VerificationStatus};
use almoner_core::liquidation::LiquidationError;
use almoner_core::role::ActorRole;
use almoner_db::entities::{liquidations, receipts};
use almoner_db::LiquidationRepository;
use almoner_shared::types::{Money, PageRequest};

use crate::middleware::ActorContext;
use crate::routes::{error_response, validation_response};
use crate::AppState;

/// Creates the liquidation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/liquidations", post(create_liquidation))
        .route("/liquidations/pending", get(pending_liquidations))
        .route("/liquidations/{liquidation_id}", get(get_liquidation))
        .route("/liquidations/{liquidation_id}/receipts", post(attach_receipt))
        .route("/liquidations/{liquidation_id}/submit", post(submit_for_approval))
        .route("/liquidations/{liquidation_id}/approve", post(approve_liquidation))
        .route("/liquidations/{liquidation_id}/reject", post(reject_liquidation))
        .route(
            "/liquidations/{liquidation_id}/receipts/{receipt_id}/review",
            post(review_receipt),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for opening a liquidation.
#[derive(Debug, Deserialize)]
pub struct CreateLiquidationRequest {
    /// The received disbursement being accounted for.
    pub disbursement_id: Uuid,
    /// The claimed spent amount as a decimal string.
    pub claimed_amount: String,
}

/// Request body for attaching a receipt.
#[derive(Debug, Deserialize, Validate)]
pub struct AttachReceiptRequest {
    /// Receipt amount as a decimal string.
    pub amount: String,
    /// Vendor receipt number.
    #[validate(length(min = 1, max = 64))]
    pub receipt_number: String,
    /// Date on the receipt (YYYY-MM-DD).
    pub receipt_date: NaiveDate,
    /// Free-text description.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Opaque reference into the file store.
    pub file_ref: Option<String>,
}

/// Request body for an approval.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    /// Approver notes.
    pub notes: Option<String>,
}

/// Request body for a rejection.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the liquidation is rejected.
    pub reason: String,
}

/// Request body for a receipt verification update.
#[derive(Debug, Deserialize)]
pub struct ReviewReceiptRequest {
    /// pending, verified, or questioned.
    pub verification_status: String,
    /// Reviewer notes.
    pub notes: Option<String>,
}

/// One approval level's decision record.
#[derive(Debug, Serialize)]
pub struct LevelReviewResponse {
    /// Approver, once decided.
    pub approved_by: Option<Uuid>,
    /// Decision timestamp.
    pub approved_at: Option<String>,
    /// Approver notes.
    pub notes: Option<String>,
}

/// Response for a receipt.
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    /// Receipt ID.
    pub id: Uuid,
    /// Amount.
    pub amount: String,
    /// Vendor receipt number.
    pub receipt_number: String,
    /// Date on the receipt.
    pub receipt_date: String,
    /// Description.
    pub description: Option<String>,
    /// File store reference.
    pub file_ref: Option<String>,
    /// Verification state.
    pub verification_status: String,
    /// Verification notes.
    pub verification_notes: Option<String>,
}

impl From<receipts::Model> for ReceiptResponse {
    fn from(m: receipts::Model) -> Self {
        Self {
            id: m.id,
            amount: m.amount.to_string(),
            receipt_number: m.receipt_number,
            receipt_date: m.receipt_date.to_string(),
            description: m.description,
            file_ref: m.file_ref,
            verification_status: m.verification_status.to_value(),
            verification_notes: m.verification_notes,
        }
    }
}

/// Response for a liquidation, including its approval history.
#[derive(Debug, Serialize)]
pub struct LiquidationResponse {
    /// Liquidation ID.
    pub id: Uuid,
    /// Parent disbursement.
    pub disbursement_id: Uuid,
    /// Accounting beneficiary.
    pub beneficiary_id: Uuid,
    /// Fund category.
    pub fund_category: String,
    /// Claimed spent amount.
    pub claimed_amount: String,
    /// Sum of receipt amounts.
    pub receipt_total: String,
    /// Claimed minus receipts.
    pub remaining_amount: String,
    /// Whether receipts fully cover the claim.
    pub is_complete: bool,
    /// Current status.
    pub status: String,
    /// Caseworker-level record.
    pub caseworker: LevelReviewResponse,
    /// Finance-level record.
    pub finance: LevelReviewResponse,
    /// Director-level record.
    pub director: LevelReviewResponse,
    /// Level of rejection, if rejected.
    pub rejected_at_level: Option<String>,
    /// Rejection reason.
    pub rejection_reason: Option<String>,
    /// Attached receipts, when loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipts: Option<Vec<ReceiptResponse>>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl LiquidationResponse {
    fn from_model(m: liquidations::Model, receipt_rows: Option<Vec<receipts::Model>>) -> Self {
        Self {
            id: m.id,
            disbursement_id: m.disbursement_id,
            beneficiary_id: m.beneficiary_id,
            fund_category: m.fund_category.to_value(),
            claimed_amount: m.claimed_amount.to_string(),
            receipt_total: m.receipt_total.to_string(),
            remaining_amount: m.remaining_amount.to_string(),
            is_complete: m.is_complete,
            status: m.status.to_value(),
            caseworker: LevelReviewResponse {
                approved_by: m.caseworker_approved_by,
                approved_at: m.caseworker_approved_at.map(|t| t.to_rfc3339()),
                notes: m.caseworker_notes,
            },
            finance: LevelReviewResponse {
                approved_by: m.finance_approved_by,
                approved_at: m.finance_approved_at.map(|t| t.to_rfc3339()),
                notes: m.finance_notes,
            },
            director: LevelReviewResponse {
                approved_by: m.director_approved_by,
                approved_at: m.director_approved_at.map(|t| t.to_rfc3339()),
                notes: m.director_notes,
            },
            rejected_at_level: m.rejected_at_level.map(|l| l.to_value()),
            rejection_reason: m.rejection_reason,
            receipts: receipt_rows.map(|rows| {
                rows.into_iter().map(ReceiptResponse::from).collect()
            }),
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

impl From<liquidations::Model> for LiquidationResponse {
    fn from(m: liquidations::Model) -> Self {
        Self::from_model(m, None)
    }
}

fn map_error(e: &LiquidationError) -> Response {
    error_response(e.status_code(), e.error_code(), e.to_string())
}

/// Resolves the approval level a role decides at.
fn level_for_role(role: ActorRole) -> Option<ApprovalLevel> {
    match role {
        ActorRole::Caseworker => Some(ApprovalLevel::Caseworker),
        ActorRole::Finance => Some(ApprovalLevel::Finance),
        ActorRole::Director => Some(ApprovalLevel::Director),
        ActorRole::Beneficiary | ActorRole::Admin => None,
    }
}

fn no_approval_level() -> Response {
    error_response(
        403,
        "FORBIDDEN",
        "This role does not decide liquidation approvals".to_string(),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Opens a liquidation against a received disbursement. Beneficiaries
/// only.
async fn create_liquidation(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreateLiquidationRequest>,
) -> Response {
    if actor.role != ActorRole::Beneficiary {
        return error_response(
            403,
            "FORBIDDEN",
            "Only beneficiaries can open liquidations".to_string(),
        );
    }
    let Some(claimed) = Decimal::from_str(&payload.claimed_amount)
        .ok()
        .and_then(Money::new)
    else {
        return error_response(
            400,
            "INVALID_AMOUNT",
            format!(
                "Claimed amount is not a valid non-negative decimal: {}",
                payload.claimed_amount
            ),
        );
    };

    let repo = LiquidationRepository::new((*state.db).clone());
    match repo.create(payload.disbursement_id, claimed).await {
        Ok(model) => {
            (StatusCode::CREATED, Json(LiquidationResponse::from(model))).into_response()
        }
        Err(e) => map_error(&e),
    }
}

/// Attaches a receipt to a liquidation.
async fn attach_receipt(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(liquidation_id): Path<Uuid>,
    Json(payload): Json<AttachReceiptRequest>,
) -> Response {
    if actor.role != ActorRole::Beneficiary {
        return error_response(
            403,
            "FORBIDDEN",
            "Only beneficiaries can attach receipts".to_string(),
        );
    }
    if let Err(errors) = payload.validate() {
        return validation_response(&errors);
    }
    let Some(amount) = Decimal::from_str(&payload.amount).ok().and_then(Money::new) else {
        return error_response(
            400,
            "INVALID_AMOUNT",
            format!("Amount is not a valid non-negative decimal: {}", payload.amount),
        );
    };

    let repo = LiquidationRepository::new((*state.db).clone());
    match repo
        .attach_receipt(
            liquidation_id,
            AttachReceiptInput {
                amount,
                receipt_number: payload.receipt_number,
                receipt_date: payload.receipt_date,
                description: payload.description,
                file_ref: payload.file_ref,
            },
        )
        .await
    {
        Ok(model) => Json(LiquidationResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Submits a complete liquidation into the approval chain.
async fn submit_for_approval(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(liquidation_id): Path<Uuid>,
) -> Response {
    if actor.role != ActorRole::Beneficiary {
        return error_response(
            403,
            "FORBIDDEN",
            "Only beneficiaries can submit liquidations".to_string(),
        );
    }
    let repo = LiquidationRepository::new((*state.db).clone());
    match repo.submit_for_approval(liquidation_id).await {
        Ok(model) => Json(LiquidationResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Approves a liquidation at the caller's level.
async fn approve_liquidation(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(liquidation_id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> Response {
    let Some(level) = level_for_role(actor.role) else {
        return no_approval_level();
    };
    let repo = LiquidationRepository::new((*state.db).clone());
    match repo
        .approve(liquidation_id, level, actor.user_id, payload.notes)
        .await
    {
        Ok(model) => Json(LiquidationResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Rejects a liquidation at the caller's level; terminal.
async fn reject_liquidation(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(liquidation_id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> Response {
    let Some(level) = level_for_role(actor.role) else {
        return no_approval_level();
    };
    let repo = LiquidationRepository::new((*state.db).clone());
    match repo
        .reject(liquidation_id, level, actor.user_id, payload.reason)
        .await
    {
        Ok(model) => Json(LiquidationResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Updates the verification state of one receipt.
async fn review_receipt(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((liquidation_id, receipt_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReviewReceiptRequest>,
) -> Response {
    if level_for_role(actor.role).is_none() {
        return no_approval_level();
    }
    let Some(verification) = VerificationStatus::parse(&payload.verification_status) else {
        return error_response(
            400,
            "UNKNOWN_VERIFICATION_STATUS",
            format!("Unknown verification status: {}", payload.verification_status),
        );
    };

    let repo = LiquidationRepository::new((*state.db).clone());
    match repo
        .review_receipt(liquidation_id, receipt_id, verification, payload.notes)
        .await
    {
        Ok(model) => Json(ReceiptResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Fetches one liquidation with its receipts and approval history.
async fn get_liquidation(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(liquidation_id): Path<Uuid>,
) -> Response {
    let repo = LiquidationRepository::new((*state.db).clone());
    match repo.find_with_receipts(liquidation_id).await {
        Ok((model, receipt_rows)) => {
            Json(LiquidationResponse::from_model(model, Some(receipt_rows))).into_response()
        }
        Err(e) => map_error(&e),
    }
}

/// Lists the liquidations waiting on the caller's approval level.
async fn pending_liquidations(
    State(state): State<AppState>,
    actor: ActorContext,
    Query(page): Query<PageRequest>,
) -> Response {
    let Some(level) = level_for_role(actor.role) else {
        return Json(Vec::<LiquidationResponse>::new()).into_response();
    };
    let repo = LiquidationRepository::new((*state.db).clone());
    match repo.pending_for_level(level, &page).await {
        Ok(models) => Json(
            models
                .into_iter()
                .map(LiquidationResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => map_error(&e),
    }
}
