//! Administrative routes: ledger repair and allowance recalculation.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use almoner_core::role::ActorRole;
use almoner_db::repositories::{RecalcReport, RepairReport};
use almoner_db::{ReconciliationRepository, RecalcRepository, SqlAttendanceProvider};

use crate::middleware::ActorContext;
use crate::routes::error_response;
use crate::AppState;

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/reconcile", post(repair_all))
        .route(
            "/admin/reconcile/{disbursement_id}",
            post(recompute_disbursement),
        )
        .route("/admin/recalculate-allowances", post(recalculate_allowances))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for an allowance recalculation sweep.
#[derive(Debug, Default, Deserialize)]
pub struct RecalcRequest {
    /// Limit the sweep to one beneficiary.
    pub beneficiary_id: Option<Uuid>,
}

/// Summary of a repair sweep.
#[derive(Debug, Serialize)]
pub struct RepairReportResponse {
    /// Disbursements recomputed successfully.
    pub success_count: usize,
    /// Disbursements that failed.
    pub failure_count: usize,
    /// Error messages per failed disbursement.
    pub failures: Vec<String>,
}

impl From<RepairReport> for RepairReportResponse {
    fn from(report: RepairReport) -> Self {
        Self {
            success_count: report.success_count,
            failure_count: report.failure_count,
            failures: report
                .results
                .into_iter()
                .filter_map(|r| {
                    r.error
                        .map(|e| format!("{}: {e}", r.disbursement_id))
                })
                .collect(),
        }
    }
}

/// Summary of an allowance recalculation sweep.
#[derive(Debug, Serialize)]
pub struct RecalcReportResponse {
    /// Requests whose amount changed.
    pub updated_count: usize,
    /// Beneficiaries whose unit of work failed.
    pub failure_count: usize,
    /// Error messages per failed beneficiary.
    pub failures: Vec<String>,
}

impl From<RecalcReport> for RecalcReportResponse {
    fn from(report: RecalcReport) -> Self {
        Self {
            updated_count: report.updated_count,
            failure_count: report.failure_count,
            failures: report
                .results
                .into_iter()
                .filter_map(|r| r.error.map(|e| format!("{}: {e}", r.beneficiary_id)))
                .collect(),
        }
    }
}

fn admin_only() -> Response {
    error_response(403, "FORBIDDEN", "Admin role required".to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// Re-derives the ledger of every disbursement from its liquidations.
async fn repair_all(State(state): State<AppState>, actor: ActorContext) -> Response {
    if actor.role != ActorRole::Admin {
        return admin_only();
    }
    let repo = ReconciliationRepository::new((*state.db).clone());
    match repo.repair_all().await {
        Ok(report) => {
            info!(
                recomputed = report.success_count,
                failures = report.failure_count,
                "ledger repair sweep finished"
            );
            Json(RepairReportResponse::from(report)).into_response()
        }
        Err(e) => error_response(e.status_code(), e.error_code(), e.to_string()),
    }
}

/// Re-derives the ledger of one disbursement.
async fn recompute_disbursement(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(disbursement_id): Path<Uuid>,
) -> Response {
    if actor.role != ActorRole::Admin {
        return admin_only();
    }
    let repo = ReconciliationRepository::new((*state.db).clone());
    match repo.recompute_disbursement(disbursement_id).await {
        Ok(model) => Json(super::disbursements::DisbursementResponse::from(model)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e.to_string()),
    }
}

/// Runs the allowance recalculation sweep, optionally scoped to one
/// beneficiary.
async fn recalculate_allowances(
    State(state): State<AppState>,
    actor: ActorContext,
    payload: Option<Json<RecalcRequest>>,
) -> Response {
    if actor.role != ActorRole::Admin {
        return admin_only();
    }
    let scope = payload.and_then(|Json(p)| p.beneficiary_id);

    let provider = SqlAttendanceProvider::new((*state.db).clone());
    let repo = RecalcRepository::new((*state.db).clone());
    match repo.run(&provider, scope).await {
        Ok(report) => {
            info!(
                updated = report.updated_count,
                failures = report.failure_count,
                "allowance recalculation sweep finished"
            );
            Json(RecalcReportResponse::from(report)).into_response()
        }
        Err(e) => error_response(e.status_code(), e.error_code(), e.to_string()),
    }
}
