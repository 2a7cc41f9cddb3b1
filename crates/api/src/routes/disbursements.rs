//! Disbursement routes: creation, handoff steps, and the ledger view.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use almoner_core::disbursement::DisbursementError;
use almoner_core::role::ActorRole;
use almoner_db::entities::disbursements;
use almoner_db::DisbursementRepository;
use almoner_shared::types::PageRequest;

use crate::middleware::ActorContext;
use crate::routes::error_response;
use crate::AppState;

/// Creates the disbursement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/disbursements", post(create_disbursement))
        .route("/disbursements/pending", get(pending_disbursements))
        .route("/disbursements/{disbursement_id}", get(get_disbursement))
        .route("/disbursements/{disbursement_id}", delete(delete_disbursement))
        .route("/disbursements/{disbursement_id}/ledger", get(get_ledger))
        .route(
            "/disbursements/{disbursement_id}/finance-disburse",
            post(finance_disburse),
        )
        .route(
            "/disbursements/{disbursement_id}/caseworker-receive",
            post(caseworker_receive),
        )
        .route(
            "/disbursements/{disbursement_id}/caseworker-disburse",
            post(caseworker_disburse),
        )
        .route(
            "/disbursements/{disbursement_id}/beneficiary-receive",
            post(beneficiary_receive),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a disbursement.
#[derive(Debug, Deserialize)]
pub struct CreateDisbursementRequest {
    /// The fully-approved aid request to pay out.
    pub aid_request_id: Uuid,
    /// Handoff paperwork reference.
    pub reference_number: String,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Response for a disbursement, including the ledger snapshot.
#[derive(Debug, Serialize)]
pub struct DisbursementResponse {
    /// Disbursement ID.
    pub id: Uuid,
    /// The aid request being paid out.
    pub aid_request_id: Uuid,
    /// Receiving beneficiary.
    pub beneficiary_id: Uuid,
    /// Disbursed amount.
    pub amount: String,
    /// Handoff status.
    pub status: String,
    /// Paperwork reference.
    pub reference_number: String,
    /// Notes.
    pub notes: Option<String>,
    /// Ledger snapshot.
    pub ledger: LedgerResponse,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

/// The derived liquidation totals of a disbursement.
#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    /// Sum of approved liquidation claims.
    pub liquidated_amount: String,
    /// Amount still to be liquidated.
    pub remaining_to_liquidate: String,
    /// Whether the disbursement is fully liquidated.
    pub fully_liquidated: bool,
    /// When it first became fully liquidated.
    pub fully_liquidated_at: Option<String>,
}

impl From<disbursements::Model> for DisbursementResponse {
    fn from(m: disbursements::Model) -> Self {
        Self {
            id: m.id,
            aid_request_id: m.aid_request_id,
            beneficiary_id: m.beneficiary_id,
            amount: m.amount.to_string(),
            status: m.status.to_value(),
            reference_number: m.reference_number,
            notes: m.notes,
            ledger: LedgerResponse {
                liquidated_amount: m.liquidated_amount.to_string(),
                remaining_to_liquidate: m.remaining_to_liquidate.to_string(),
                fully_liquidated: m.fully_liquidated,
                fully_liquidated_at: m.fully_liquidated_at.map(|t| t.to_rfc3339()),
            },
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

fn map_error(e: &DisbursementError) -> Response {
    error_response(e.status_code(), e.error_code(), e.to_string())
}

fn forbidden(expected: ActorRole) -> Response {
    error_response(
        403,
        "FORBIDDEN",
        format!("This step requires the {expected} role"),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Creates the disbursement for a fully-approved aid request. Finance
/// initiates the payout.
async fn create_disbursement(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreateDisbursementRequest>,
) -> Response {
    if actor.role != ActorRole::Finance {
        return forbidden(ActorRole::Finance);
    }

    let repo = DisbursementRepository::new((*state.db).clone());
    match repo
        .create_from_approved_request(
            payload.aid_request_id,
            actor.user_id,
            payload.reference_number,
            payload.notes,
        )
        .await
    {
        Ok(model) => {
            (StatusCode::CREATED, Json(DisbursementResponse::from(model))).into_response()
        }
        Err(e) => map_error(&e),
    }
}

/// Finance releases the funds.
async fn finance_disburse(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(disbursement_id): Path<Uuid>,
) -> Response {
    if actor.role != ActorRole::Finance {
        return forbidden(ActorRole::Finance);
    }
    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.finance_disburse(disbursement_id, actor.user_id).await {
        Ok(model) => Json(DisbursementResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// The caseworker acknowledges receiving the funds.
async fn caseworker_receive(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(disbursement_id): Path<Uuid>,
) -> Response {
    if actor.role != ActorRole::Caseworker {
        return forbidden(ActorRole::Caseworker);
    }
    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.caseworker_receive(disbursement_id, actor.user_id).await {
        Ok(model) => Json(DisbursementResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// The caseworker hands the funds to the beneficiary.
async fn caseworker_disburse(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(disbursement_id): Path<Uuid>,
) -> Response {
    if actor.role != ActorRole::Caseworker {
        return forbidden(ActorRole::Caseworker);
    }
    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.caseworker_disburse(disbursement_id, actor.user_id).await {
        Ok(model) => Json(DisbursementResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// The beneficiary confirms receipt.
async fn beneficiary_receive(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(disbursement_id): Path<Uuid>,
) -> Response {
    if actor.role != ActorRole::Beneficiary {
        return forbidden(ActorRole::Beneficiary);
    }
    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.beneficiary_receive(disbursement_id, actor.user_id).await {
        Ok(model) => Json(DisbursementResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Fetches one disbursement.
async fn get_disbursement(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(disbursement_id): Path<Uuid>,
) -> Response {
    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.find(disbursement_id).await {
        Ok(model) => Json(DisbursementResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Fetches the current ledger snapshot of a disbursement.
async fn get_ledger(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(disbursement_id): Path<Uuid>,
) -> Response {
    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.find(disbursement_id).await {
        Ok(m) => Json(LedgerResponse {
            liquidated_amount: m.liquidated_amount.to_string(),
            remaining_to_liquidate: m.remaining_to_liquidate.to_string(),
            fully_liquidated: m.fully_liquidated,
            fully_liquidated_at: m.fully_liquidated_at.map(|t| t.to_rfc3339()),
        })
        .into_response(),
        Err(e) => map_error(&e),
    }
}

/// Lists the disbursements waiting on the caller's next handoff step.
async fn pending_disbursements(
    State(state): State<AppState>,
    actor: ActorContext,
    Query(page): Query<PageRequest>,
) -> Response {
    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.pending_for_role(actor.role, &page).await {
        Ok(models) => Json(
            models
                .into_iter()
                .map(DisbursementResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => map_error(&e),
    }
}

/// Deletes a disbursement without in-flight liquidations. Admin only.
async fn delete_disbursement(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(disbursement_id): Path<Uuid>,
) -> Response {
    if actor.role != ActorRole::Admin {
        return forbidden(ActorRole::Admin);
    }
    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.delete(disbursement_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => map_error(&e),
    }
}
