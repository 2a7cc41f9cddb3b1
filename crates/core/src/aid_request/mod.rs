//! Aid request review for Almoner.
//!
//! An aid request passes a three-stage review (caseworker, finance,
//! director) before its funds can be disbursed. This module implements
//! the stage cursor state machine, submission validation, and the
//! attendance-based amount recalculation.
//!
//! # Modules
//!
//! - `types` - Aid request domain types (FundCategory, ReviewStage, ...)
//! - `error` - Aid-request-specific error types
//! - `service` - Submission and stage review logic
//! - `allowance` - Attendance-derived allowance calculation

pub mod allowance;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use allowance::AttendanceSummary;
pub use error::AidRequestError;
pub use service::{AidRequestService, SubmitAidRequestInput};
pub use types::{
    AidRequest, FundCategory, Period, ReviewDecision, ReviewStage, StageDecision, StageReview,
};
