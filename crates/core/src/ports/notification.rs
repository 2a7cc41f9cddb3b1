//! Notification sink port.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened, from the recipient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A review stage of an aid request was decided.
    AidRequestDecided,
    /// A disbursement handoff step was completed.
    DisbursementAdvanced,
    /// A liquidation was submitted for approval.
    LiquidationSubmitted,
    /// A liquidation reached a terminal outcome.
    LiquidationConcluded,
}

impl NotificationKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AidRequestDecided => "aid_request_decided",
            Self::DisbursementAdvanced => "disbursement_advanced",
            Self::LiquidationSubmitted => "liquidation_submitted",
            Self::LiquidationConcluded => "liquidation_concluded",
        }
    }
}

/// A notification to be delivered to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Who should be notified.
    pub recipient_id: Uuid,
    /// What happened.
    pub kind: NotificationKind,
    /// The entity the event concerns.
    pub entity_id: Uuid,
    /// Human-readable summary.
    pub message: String,
}

/// Fire-and-forget delivery of notifications.
///
/// Called after terminal transitions commit. Implementations must
/// swallow delivery failures; a failed notification never rolls back
/// the transition that produced it.
pub trait NotificationSink: Send + Sync {
    /// Delivers a notification, best-effort.
    fn notify(&self, notification: Notification)
    -> impl std::future::Future<Output = ()> + Send;
}
