//! Disbursement repository: creation from approved requests, the
//! four-step handoff, and the ledger query surface.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use almoner_core::disbursement::service::DisbursementService;
use almoner_core::disbursement::types::{Disbursement, DisbursementStatus};
use almoner_core::disbursement::DisbursementError;
use almoner_core::ports::{
    AuditRecord, AuditSink, EntityKind, Notification, NotificationKind, NotificationSink,
};
use almoner_core::role::ActorRole;
use almoner_shared::types::PageRequest;

use crate::entities::{disbursements, liquidations, receipts, sea_orm_active_enums};
use crate::sinks::{TracingAuditSink, TracingNotificationSink};

use super::convert;

/// Repository for disbursement lifecycle operations.
#[derive(Debug, Clone)]
pub struct DisbursementRepository<N = TracingNotificationSink, A = TracingAuditSink> {
    db: DatabaseConnection,
    notifier: N,
    audit: A,
}

impl DisbursementRepository {
    /// Creates a repository with the tracing-backed sinks.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            notifier: TracingNotificationSink,
            audit: TracingAuditSink,
        }
    }
}

impl<N: NotificationSink, A: AuditSink> DisbursementRepository<N, A> {
    /// Creates a repository with custom notification and audit sinks.
    #[must_use]
    pub const fn with_sinks(db: DatabaseConnection, notifier: N, audit: A) -> Self {
        Self {
            db,
            notifier,
            audit,
        }
    }

    /// Creates the disbursement for a fully-approved aid request.
    ///
    /// Invoked exactly once per request; the unique index on
    /// `aid_request_id` turns a second call into
    /// `DuplicateDisbursement`.
    ///
    /// # Errors
    ///
    /// * `AidRequestNotFound` for an unknown request
    /// * `RequestNotFullyApproved` before the director has approved
    /// * `DuplicateDisbursement` if one already exists
    pub async fn create_from_approved_request(
        &self,
        aid_request_id: Uuid,
        actor: Uuid,
        reference_number: String,
        notes: Option<String>,
    ) -> Result<disbursements::Model, DisbursementError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        let request_model = crate::entities::aid_requests::Entity::find_by_id(aid_request_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?
            .ok_or(DisbursementError::AidRequestNotFound(aid_request_id))?;

        let request =
            convert::aid_request_to_core(&request_model).map_err(DisbursementError::Database)?;
        let disbursement =
            DisbursementService::create_from_approved_request(&request, reference_number, notes)?;

        let inserted = convert::disbursement_to_active(&disbursement)
            .insert(&txn)
            .await
            .map_err(|e| {
                if e.to_string().contains("uq_disbursements_aid_request") {
                    DisbursementError::DuplicateDisbursement(aid_request_id)
                } else {
                    DisbursementError::Database(e.to_string())
                }
            })?;

        txn.commit()
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        self.audit
            .record(AuditRecord {
                event: "disbursement.created".to_string(),
                entity_kind: EntityKind::Disbursement,
                entity_id: inserted.id,
                actor: Some(actor),
                summary: format!("created for aid request {aid_request_id}"),
                at: Utc::now(),
            })
            .await;

        Ok(inserted)
    }

    /// Finance releases the funds.
    pub async fn finance_disburse(
        &self,
        disbursement_id: Uuid,
        actor: Uuid,
    ) -> Result<disbursements::Model, DisbursementError> {
        self.advance(
            disbursement_id,
            actor,
            DisbursementService::finance_disburse,
            "funds released by finance",
        )
        .await
    }

    /// The caseworker acknowledges receiving the funds.
    pub async fn caseworker_receive(
        &self,
        disbursement_id: Uuid,
        actor: Uuid,
    ) -> Result<disbursements::Model, DisbursementError> {
        self.advance(
            disbursement_id,
            actor,
            DisbursementService::caseworker_receive,
            "funds received by caseworker",
        )
        .await
    }

    /// The caseworker hands the funds to the beneficiary.
    pub async fn caseworker_disburse(
        &self,
        disbursement_id: Uuid,
        actor: Uuid,
    ) -> Result<disbursements::Model, DisbursementError> {
        self.advance(
            disbursement_id,
            actor,
            DisbursementService::caseworker_disburse,
            "funds handed to beneficiary",
        )
        .await
    }

    /// The beneficiary confirms receipt.
    pub async fn beneficiary_receive(
        &self,
        disbursement_id: Uuid,
        actor: Uuid,
    ) -> Result<disbursements::Model, DisbursementError> {
        self.advance(
            disbursement_id,
            actor,
            DisbursementService::beneficiary_receive,
            "receipt confirmed by beneficiary",
        )
        .await
    }

    /// Fetches one disbursement, including its current ledger snapshot.
    pub async fn find(
        &self,
        disbursement_id: Uuid,
    ) -> Result<disbursements::Model, DisbursementError> {
        disbursements::Entity::find_by_id(disbursement_id)
            .one(&self.db)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?
            .ok_or(DisbursementError::NotFound(disbursement_id))
    }

    /// Returns the disbursements waiting on a role's next handoff step,
    /// oldest first.
    pub async fn pending_for_role(
        &self,
        role: ActorRole,
        page: &PageRequest,
    ) -> Result<Vec<disbursements::Model>, DisbursementError> {
        let statuses: &[sea_orm_active_enums::DisbursementStatus] = match role {
            ActorRole::Finance => &[sea_orm_active_enums::DisbursementStatus::Pending],
            ActorRole::Caseworker => &[
                sea_orm_active_enums::DisbursementStatus::FinanceDisbursed,
                sea_orm_active_enums::DisbursementStatus::CaseworkerReceived,
            ],
            ActorRole::Beneficiary => {
                &[sea_orm_active_enums::DisbursementStatus::CaseworkerDisbursed]
            }
            ActorRole::Director | ActorRole::Admin => return Ok(vec![]),
        };

        disbursements::Entity::find()
            .filter(disbursements::Column::Status.is_in(statuses.iter().cloned()))
            .order_by_asc(disbursements::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))
    }

    /// Deletes a disbursement and its terminal liquidations.
    ///
    /// Denied while any liquidation is still in flight; the rule is
    /// enforced here, not by storage cascades.
    ///
    /// # Errors
    ///
    /// * `NotFound` for an unknown id
    /// * `HasActiveLiquidations` while non-terminal liquidations exist
    pub async fn delete(&self, disbursement_id: Uuid) -> Result<(), DisbursementError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        let model = disbursements::Entity::find_by_id(disbursement_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?
            .ok_or(DisbursementError::NotFound(disbursement_id))?;

        let active = liquidations::Entity::find()
            .filter(liquidations::Column::DisbursementId.eq(disbursement_id))
            .filter(liquidations::Column::Status.is_not_in([
                sea_orm_active_enums::LiquidationStatus::Approved,
                sea_orm_active_enums::LiquidationStatus::Rejected,
            ]))
            .count(&txn)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;
        DisbursementService::ensure_deletable(usize::try_from(active).unwrap_or(usize::MAX))?;

        let liquidation_ids: Vec<Uuid> = liquidations::Entity::find()
            .filter(liquidations::Column::DisbursementId.eq(disbursement_id))
            .select_only()
            .column(liquidations::Column::Id)
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        if !liquidation_ids.is_empty() {
            receipts::Entity::delete_many()
                .filter(receipts::Column::LiquidationId.is_in(liquidation_ids.clone()))
                .exec(&txn)
                .await
                .map_err(|e| DisbursementError::Database(e.to_string()))?;
            liquidations::Entity::delete_many()
                .filter(liquidations::Column::Id.is_in(liquidation_ids))
                .exec(&txn)
                .await
                .map_err(|e| DisbursementError::Database(e.to_string()))?;
        }

        model
            .delete(&txn)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Runs one handoff step under the row lock and notifies on success.
    async fn advance(
        &self,
        disbursement_id: Uuid,
        actor: Uuid,
        transition: fn(Disbursement, Uuid) -> Result<Disbursement, DisbursementError>,
        milestone: &str,
    ) -> Result<disbursements::Model, DisbursementError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        let model = disbursements::Entity::find_by_id(disbursement_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?
            .ok_or(DisbursementError::NotFound(disbursement_id))?;

        let disbursement =
            convert::disbursement_to_core(&model).map_err(DisbursementError::Database)?;
        let before: DisbursementStatus = disbursement.status;
        let updated = transition(disbursement, actor)?;

        let saved = convert::disbursement_to_active(&updated)
            .update(&txn)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        self.audit
            .record(AuditRecord {
                event: "disbursement.advanced".to_string(),
                entity_kind: EntityKind::Disbursement,
                entity_id: saved.id,
                actor: Some(actor),
                summary: format!("{before} -> {}", updated.status),
                at: Utc::now(),
            })
            .await;
        self.notifier
            .notify(Notification {
                recipient_id: saved.beneficiary_id,
                kind: NotificationKind::DisbursementAdvanced,
                entity_id: saved.id,
                message: format!("Disbursement {}: {milestone}", saved.reference_number),
            })
            .await;

        Ok(saved)
    }
}
