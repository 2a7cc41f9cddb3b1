//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every state transition runs inside a transaction that
//! locks the aggregate row before evaluating the core precondition, so
//! racing callers fail on the precondition check rather than
//! overwriting a decision.

pub mod aid_request;
pub mod disbursement;
pub mod liquidation;
pub mod recalc;
pub mod reconciliation;

mod convert;

pub use aid_request::AidRequestRepository;
pub use disbursement::DisbursementRepository;
pub use liquidation::LiquidationRepository;
pub use recalc::{RecalcItemResult, RecalcReport, RecalcRepository};
pub use reconciliation::{ReconciliationRepository, RepairItemResult, RepairReport};
