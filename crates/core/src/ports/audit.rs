//! Audit sink port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of entity an audit record concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// An aid request.
    AidRequest,
    /// A disbursement.
    Disbursement,
    /// A liquidation.
    Liquidation,
}

impl EntityKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AidRequest => "aid_request",
            Self::Disbursement => "disbursement",
            Self::Liquidation => "liquidation",
        }
    }
}

/// An immutable record of one state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Event name, e.g. `aid_request.reviewed`.
    pub event: String,
    /// Kind of the affected entity.
    pub entity_kind: EntityKind,
    /// The affected entity.
    pub entity_id: Uuid,
    /// Who performed the transition, when known.
    pub actor: Option<Uuid>,
    /// Before/after summary of the transition.
    pub summary: String,
    /// When the transition happened.
    pub at: DateTime<Utc>,
}

/// Receives audit records for every state transition.
///
/// Delivery is asynchronous relative to the transition's own
/// transaction; implementations must swallow failures.
pub trait AuditSink: Send + Sync {
    /// Records an audit entry, best-effort.
    fn record(&self, record: AuditRecord) -> impl std::future::Future<Output = ()> + Send;
}
