//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the approval chains and query surface
//! - Actor-context extraction from gateway headers
//! - Response types
//!
//! The service never authenticates: the upstream gateway resolves the
//! caller and passes identity and role in headers (see
//! [`middleware::actor::ActorContext`]).

pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
