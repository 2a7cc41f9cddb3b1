//! Liquidation accounting for Almoner.
//!
//! After a beneficiary receives a disbursement, they account for how
//! the funds were spent by attaching receipts to a liquidation and
//! submitting it through a three-tier approval chain (caseworker,
//! finance, director). Approved liquidations roll up into the
//! disbursement's ledger via the reconciliation engine.
//!
//! # Modules
//!
//! - `types` - Liquidation domain types (status, levels, receipts)
//! - `error` - Liquidation-specific error types
//! - `service` - Receipt attachment, submission, and approval logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LiquidationError;
pub use service::{AttachReceiptInput, LiquidationService};
pub use types::{
    ApprovalLevel, LevelReview, Liquidation, LiquidationStatus, Receipt, VerificationStatus,
};
