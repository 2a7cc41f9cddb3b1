//! Disbursement handoff for Almoner.
//!
//! Once an aid request is fully approved, its funds move through a
//! strictly ordered four-step physical handoff: finance releases the
//! money, the caseworker receives it, the caseworker hands it to the
//! beneficiary, and the beneficiary confirms receipt. This module
//! implements that state machine and the derived liquidation ledger
//! fields.
//!
//! # Modules
//!
//! - `types` - Disbursement domain types and the ledger snapshot
//! - `error` - Disbursement-specific error types
//! - `service` - Creation and handoff transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::DisbursementError;
pub use service::DisbursementService;
pub use types::{Disbursement, DisbursementStatus, LedgerSnapshot};
