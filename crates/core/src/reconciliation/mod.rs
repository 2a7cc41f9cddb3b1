//! Disbursement ledger reconciliation.
//!
//! The reconciliation engine is the single writer of a disbursement's
//! derived liquidation fields. It re-derives them from the authoritative
//! liquidation rows, so running it after an approval, from the repair
//! tool, or twice in a row always lands on the same values.

pub mod engine;

#[cfg(test)]
mod engine_props;

pub use engine::ReconciliationEngine;
