//! Tracing-backed notification and audit sinks.
//!
//! The production deployments wire real delivery behind these ports;
//! this crate ships structured-log implementations so every terminal
//! transition is observable out of the box. Both are fire-and-forget:
//! nothing here can fail the owning transaction.

use tracing::info;

use almoner_core::ports::{AuditRecord, AuditSink, Notification, NotificationSink};

/// Notification sink that emits structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, notification: Notification) {
        info!(
            recipient = %notification.recipient_id,
            kind = notification.kind.as_str(),
            entity = %notification.entity_id,
            message = %notification.message,
            "notification"
        );
    }
}

/// Audit sink that emits structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) {
        info!(
            event = %record.event,
            entity_kind = record.entity_kind.as_str(),
            entity = %record.entity_id,
            actor = ?record.actor,
            at = %record.at,
            summary = %record.summary,
            "audit"
        );
    }
}
