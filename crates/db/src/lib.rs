//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - Tracing-backed notification and audit sinks
//!
//! Repositories fetch state, delegate every transition decision to
//! `almoner-core`, and persist the outcome inside a row-locked
//! transaction, so a racing caller always loses on the precondition
//! check rather than overwriting a decision.

pub mod attendance;
pub mod entities;
pub mod migration;
pub mod repositories;
pub mod sinks;

pub use attendance::SqlAttendanceProvider;
pub use repositories::{
    AidRequestRepository, DisbursementRepository, LiquidationRepository,
    ReconciliationRepository, RecalcRepository,
};
pub use sinks::{TracingAuditSink, TracingNotificationSink};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
