//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;

pub mod admin;
pub mod aid_requests;
pub mod disbursements;
pub mod health;
pub mod liquidations;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(aid_requests::routes())
        .merge(disbursements::routes())
        .merge(liquidations::routes())
        .merge(admin::routes())
}

/// Renders a domain error as a JSON response.
pub(crate) fn error_response(status: u16, code: &str, message: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": code,
            "message": message,
        })),
    )
        .into_response()
}

/// Renders request validation failures as a 400 response.
pub(crate) fn validation_response(errors: &validator::ValidationErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": errors.to_string(),
        })),
    )
        .into_response()
}
