//! Aid request routes: submission, stage review, and queues.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use almoner_core::aid_request::service::SubmitAidRequestInput;
use almoner_core::aid_request::types::{FundCategory, Period, ReviewDecision};
use almoner_core::aid_request::AidRequestError;
use almoner_core::role::ActorRole;
use almoner_db::entities::aid_requests;
use almoner_db::AidRequestRepository;
use almoner_shared::types::{Money, PageRequest};

use crate::middleware::ActorContext;
use crate::routes::{error_response, validation_response};
use crate::AppState;

/// Creates the aid request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/aid-requests", post(create_aid_request))
        .route("/aid-requests", get(list_my_requests))
        .route("/aid-requests/pending", get(pending_aid_requests))
        .route("/aid-requests/{request_id}", get(get_aid_request))
        .route("/aid-requests/{request_id}/review", post(review_aid_request))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting an aid request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAidRequestRequest {
    /// Fund category (tuition, cost_of_living, other).
    pub fund_category: String,
    /// Requested amount as a decimal string.
    pub amount: String,
    /// Period month (cost-of-living only).
    #[validate(range(min = 1, max = 12))]
    pub period_month: Option<u8>,
    /// Period year (cost-of-living only).
    #[validate(range(min = 2000, max = 2100))]
    pub period_year: Option<i32>,
    /// Free-text purpose.
    #[validate(length(min = 1, max = 2000))]
    pub purpose: String,
}

/// Request body for a stage decision.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// `approve` or `reject`.
    pub decision: String,
    /// Reviewer notes; required for rejections.
    pub notes: Option<String>,
}

/// One stage's decision record.
#[derive(Debug, Serialize)]
pub struct StageReviewResponse {
    /// pending, approved, or rejected.
    pub decision: String,
    /// Reviewer, once decided.
    pub reviewed_by: Option<Uuid>,
    /// Decision timestamp.
    pub reviewed_at: Option<String>,
    /// Reviewer notes.
    pub notes: Option<String>,
}

/// Response for an aid request, including its full review history.
#[derive(Debug, Serialize)]
pub struct AidRequestResponse {
    /// Request ID.
    pub id: Uuid,
    /// Submitting beneficiary.
    pub beneficiary_id: Uuid,
    /// Facility unit.
    pub unit_id: Option<Uuid>,
    /// Fund category.
    pub fund_category: String,
    /// Requested amount.
    pub amount: String,
    /// Period month, if any.
    pub period_month: Option<i16>,
    /// Period year, if any.
    pub period_year: Option<i32>,
    /// Purpose text.
    pub purpose: String,
    /// Stage cursor.
    pub stage: String,
    /// Caseworker stage record.
    pub caseworker: StageReviewResponse,
    /// Finance stage record.
    pub finance: StageReviewResponse,
    /// Director stage record.
    pub director: StageReviewResponse,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<aid_requests::Model> for AidRequestResponse {
    fn from(m: aid_requests::Model) -> Self {
        Self {
            id: m.id,
            beneficiary_id: m.beneficiary_id,
            unit_id: m.unit_id,
            fund_category: m.fund_category.to_value(),
            amount: m.amount.to_string(),
            period_month: m.period_month,
            period_year: m.period_year,
            purpose: m.purpose,
            stage: m.stage.to_value(),
            caseworker: StageReviewResponse {
                decision: m.caseworker_decision.to_value(),
                reviewed_by: m.caseworker_reviewed_by,
                reviewed_at: m.caseworker_reviewed_at.map(|t| t.to_rfc3339()),
                notes: m.caseworker_notes,
            },
            finance: StageReviewResponse {
                decision: m.finance_decision.to_value(),
                reviewed_by: m.finance_reviewed_by,
                reviewed_at: m.finance_reviewed_at.map(|t| t.to_rfc3339()),
                notes: m.finance_notes,
            },
            director: StageReviewResponse {
                decision: m.director_decision.to_value(),
                reviewed_by: m.director_reviewed_by,
                reviewed_at: m.director_reviewed_at.map(|t| t.to_rfc3339()),
                notes: m.director_notes,
            },
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

fn map_error(e: &AidRequestError) -> Response {
    error_response(e.status_code(), e.error_code(), e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// Submits a new aid request. Beneficiaries only.
async fn create_aid_request(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreateAidRequestRequest>,
) -> Response {
    if actor.role != ActorRole::Beneficiary {
        return error_response(
            403,
            "FORBIDDEN",
            "Only beneficiaries can submit aid requests".to_string(),
        );
    }
    if let Err(errors) = payload.validate() {
        return validation_response(&errors);
    }

    let Some(category) = FundCategory::parse(&payload.fund_category) else {
        return error_response(
            400,
            "UNKNOWN_FUND_CATEGORY",
            format!("Unknown fund category: {}", payload.fund_category),
        );
    };
    let Some(amount) = Decimal::from_str(&payload.amount).ok().and_then(Money::new) else {
        return error_response(
            400,
            "INVALID_AMOUNT",
            format!("Amount is not a valid non-negative decimal: {}", payload.amount),
        );
    };
    let period = match (payload.period_month, payload.period_year) {
        (Some(month), Some(year)) => match Period::new(month, year) {
            Some(period) => Some(period),
            None => {
                return error_response(
                    400,
                    "INVALID_PERIOD",
                    format!("Invalid period: {year}-{month}"),
                );
            }
        },
        _ => None,
    };

    let repo = AidRequestRepository::new((*state.db).clone());
    match repo
        .submit(SubmitAidRequestInput {
            beneficiary_id: actor.user_id,
            unit_id: actor.unit_id,
            category,
            amount,
            period,
            purpose: payload.purpose,
        })
        .await
    {
        Ok(model) => (StatusCode::CREATED, Json(AidRequestResponse::from(model))).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Records a stage decision on an aid request.
async fn review_aid_request(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Response {
    let decision = match payload.decision.to_lowercase().as_str() {
        "approve" | "approved" => ReviewDecision::Approve,
        "reject" | "rejected" => ReviewDecision::Reject,
        other => {
            return error_response(
                400,
                "UNKNOWN_DECISION",
                format!("Unknown decision: {other}"),
            );
        }
    };

    let repo = AidRequestRepository::new((*state.db).clone());
    match repo
        .review(request_id, actor.role, actor.user_id, decision, payload.notes)
        .await
    {
        Ok(model) => Json(AidRequestResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Fetches one aid request with its full review history.
async fn get_aid_request(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(request_id): Path<Uuid>,
) -> Response {
    let repo = AidRequestRepository::new((*state.db).clone());
    match repo.find(request_id).await {
        Ok(model) => Json(AidRequestResponse::from(model)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// Lists the requests waiting on the caller's role.
async fn pending_aid_requests(
    State(state): State<AppState>,
    actor: ActorContext,
    Query(page): Query<PageRequest>,
) -> Response {
    let repo = AidRequestRepository::new((*state.db).clone());
    match repo.pending_for_role(actor.role, actor.unit_id, &page).await {
        Ok(models) => Json(
            models
                .into_iter()
                .map(AidRequestResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => map_error(&e),
    }
}

/// Lists the caller's own requests, newest first.
async fn list_my_requests(
    State(state): State<AppState>,
    actor: ActorContext,
    Query(page): Query<PageRequest>,
) -> Response {
    let repo = AidRequestRepository::new((*state.db).clone());
    match repo.list_for_beneficiary(actor.user_id, &page).await {
        Ok(models) => Json(
            models
                .into_iter()
                .map(AidRequestResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => map_error(&e),
    }
}
