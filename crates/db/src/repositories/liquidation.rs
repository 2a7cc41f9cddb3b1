//! Liquidation repository: creation, receipt attachment, submission,
//! and the three-tier approval chain.
//!
//! A final (director) approval recomputes the parent disbursement's
//! ledger inside the same transaction, under the same row lock the
//! repair tool takes.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use almoner_core::liquidation::service::{AttachReceiptInput, LiquidationService};
use almoner_core::liquidation::types::{ApprovalLevel, Liquidation, LiquidationStatus, VerificationStatus};
use almoner_core::liquidation::LiquidationError;
use almoner_core::ports::{
    AuditRecord, AuditSink, EntityKind, Notification, NotificationKind, NotificationSink,
};
use almoner_shared::types::{Money, PageRequest};

use crate::entities::{disbursements, liquidations, receipts, sea_orm_active_enums};
use crate::sinks::{TracingAuditSink, TracingNotificationSink};

use super::convert;
use super::reconciliation::recompute_locked;

/// Repository for liquidation lifecycle operations.
#[derive(Debug, Clone)]
pub struct LiquidationRepository<N = TracingNotificationSink, A = TracingAuditSink> {
    db: DatabaseConnection,
    notifier: N,
    audit: A,
}

impl LiquidationRepository {
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

impl<N: NotificationSink, A: AuditSink> LiquidationRepository<N, A> {
    /// Creates a repository with custom notification and audit sinks.
    #[must_use]
    pub const fn with_sinks(db: DatabaseConnection, notifier: N, audit: A) -> Self {
        Self {
            db,
            notifier,
            audit,
        }
    }

    /// Opens a liquidation against a received disbursement.
    ///
    /// The parent row is locked so concurrent claims serialize; the
    /// second of two over-committing claims fails `OverLiquidation`
    /// with the exact uncommitted remainder.
    ///
    /// # Errors
    ///
    /// * `DisbursementNotFound` for an unknown parent
    /// * `NotLiquidatable` before the beneficiary has the funds
    /// * `OverLiquidation` if the claim exceeds the uncommitted remainder
    pub async fn create(
        &self,
        disbursement_id: Uuid,
        claimed_amount: Money,
    ) -> Result<liquidations::Model, LiquidationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        let disbursement_model = disbursements::Entity::find_by_id(disbursement_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?
            .ok_or(LiquidationError::DisbursementNotFound(disbursement_id))?;
        let disbursement = convert::disbursement_to_core(&disbursement_model)
            .map_err(LiquidationError::Database)?;

        // Category is copied from the originating request for display.
        let category = crate::entities::aid_requests::Entity::find_by_id(
            disbursement_model.aid_request_id,
        )
        .one(&txn)
        .await
        .map_err(|e| LiquidationError::Database(e.to_string()))?
        .map_or(almoner_core::aid_request::types::FundCategory::Other, |r| {
            convert::category_to_core(&r.fund_category)
        });

        let outstanding = self.outstanding_claims(&txn, disbursement_id).await?;

        let liquidation =
            LiquidationService::create(&disbursement, category, claimed_amount, outstanding)?;

        let inserted = convert::liquidation_to_active(&liquidation)
            .insert(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        self.audit
            .record(AuditRecord {
                event: "liquidation.created".to_string(),
                entity_kind: EntityKind::Liquidation,
                entity_id: inserted.id,
                actor: Some(inserted.beneficiary_id),
                summary: format!(
                    "claim of {} against disbursement {disbursement_id}",
                    inserted.claimed_amount
                ),
                at: Utc::now(),
            })
            .await;

        Ok(inserted)
    }

    /// Attaches a receipt and re-derives the liquidation totals.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, plus the guard errors of
    /// `LiquidationService::attach_receipt`.
    pub async fn attach_receipt(
        &self,
        liquidation_id: Uuid,
        input: AttachReceiptInput,
    ) -> Result<liquidations::Model, LiquidationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        let liquidation = self.load_locked(&txn, liquidation_id).await?;
        let before_count = liquidation.receipts.len();
        let updated = LiquidationService::attach_receipt(liquidation, input)?;

        // Only the newly appended receipt is inserted; existing rows are
        // immutable here.
        for receipt in updated.receipts.iter().skip(before_count) {
            convert::receipt_to_active(receipt)
                .insert(&txn)
                .await
                .map_err(|e| LiquidationError::Database(e.to_string()))?;
        }

        let saved = convert::liquidation_to_active(&updated)
            .update(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        Ok(saved)
    }

    /// Submits a complete liquidation into the approval chain.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, plus the guard errors of
    /// `LiquidationService::submit_for_approval`.
    pub async fn submit_for_approval(
        &self,
        liquidation_id: Uuid,
    ) -> Result<liquidations::Model, LiquidationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        let liquidation = self.load_locked(&txn, liquidation_id).await?;
        let updated = LiquidationService::submit_for_approval(liquidation)?;

        let saved = convert::liquidation_to_active(&updated)
            .update(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        self.notifier
            .notify(Notification {
                recipient_id: saved.beneficiary_id,
                kind: NotificationKind::LiquidationSubmitted,
                entity_id: saved.id,
                message: "Your liquidation was submitted for approval".to_string(),
            })
            .await;

        Ok(saved)
    }

    /// Records an approval at `level`.
    ///
    /// A director approval reconciles the parent disbursement's ledger
    /// in the same transaction, under the parent row lock.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, plus the guard errors of
    /// `LiquidationService::approve`.
    pub async fn approve(
        &self,
        liquidation_id: Uuid,
        level: ApprovalLevel,
        approver: Uuid,
        notes: Option<String>,
    ) -> Result<liquidations::Model, LiquidationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        // Parent first, then the liquidation: same lock order as the
        // repair tool, so the two can never deadlock.
        let parent_id: Option<Uuid> = liquidations::Entity::find_by_id(liquidation_id)
            .select_only()
            .column(liquidations::Column::DisbursementId)
            .into_tuple()
            .one(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;
        let parent_id = parent_id.ok_or(LiquidationError::NotFound(liquidation_id))?;

        let disbursement_model = disbursements::Entity::find_by_id(parent_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?
            .ok_or(LiquidationError::DisbursementNotFound(parent_id))?;

        let liquidation = self.load_locked(&txn, liquidation_id).await?;
        let updated = LiquidationService::approve(liquidation, level, approver, notes)?;
        let is_final = updated.status == LiquidationStatus::Approved;

        let saved = convert::liquidation_to_active(&updated)
            .update(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        if is_final {
            recompute_locked(&txn, disbursement_model)
                .await
                .map_err(|e| LiquidationError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        self.audit
            .record(AuditRecord {
                event: "liquidation.approved".to_string(),
                entity_kind: EntityKind::Liquidation,
                entity_id: saved.id,
                actor: Some(approver),
                summary: format!("approved at {level} level"),
                at: Utc::now(),
            })
            .await;
        if is_final {
            self.notifier
                .notify(Notification {
                    recipient_id: saved.beneficiary_id,
                    kind: NotificationKind::LiquidationConcluded,
                    entity_id: saved.id,
                    message: "Your liquidation was approved".to_string(),
                })
                .await;
        }

        Ok(saved)
    }

    /// Records a rejection at `level`; terminal.
    ///
    /// The parent ledger is untouched: a rejected liquidation never
    /// contributes to the disbursement totals.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, plus the guard errors of
    /// `LiquidationService::reject`.
    pub async fn reject(
        &self,
        liquidation_id: Uuid,
        level: ApprovalLevel,
        approver: Uuid,
        reason: String,
    ) -> Result<liquidations::Model, LiquidationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        let liquidation = self.load_locked(&txn, liquidation_id).await?;
        let updated = LiquidationService::reject(liquidation, level, approver, reason)?;

        let saved = convert::liquidation_to_active(&updated)
            .update(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        self.audit
            .record(AuditRecord {
                event: "liquidation.rejected".to_string(),
                entity_kind: EntityKind::Liquidation,
                entity_id: saved.id,
                actor: Some(approver),
                summary: format!("rejected at {level} level"),
                at: Utc::now(),
            })
            .await;
        self.notifier
            .notify(Notification {
                recipient_id: saved.beneficiary_id,
                kind: NotificationKind::LiquidationConcluded,
                entity_id: saved.id,
                message: format!("Your liquidation was rejected at the {level} level"),
            })
            .await;

        Ok(saved)
    }

    /// Updates the verification state of one receipt.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` / `ReceiptNotFound` for unknown ids, plus the
    /// guard errors of `LiquidationService::review_receipt`.
    pub async fn review_receipt(
        &self,
        liquidation_id: Uuid,
        receipt_id: Uuid,
        verification: VerificationStatus,
        notes: Option<String>,
    ) -> Result<receipts::Model, LiquidationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        let liquidation = self.load_locked(&txn, liquidation_id).await?;
        let updated =
            LiquidationService::review_receipt(liquidation, receipt_id, verification, notes)?;

        let receipt = updated
            .receipts
            .iter()
            .find(|r| r.id == receipt_id)
            .ok_or(LiquidationError::ReceiptNotFound(receipt_id))?;
        let saved = convert::receipt_to_active(receipt)
            .update(&txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        Ok(saved)
    }

    /// Fetches one liquidation with its receipts: the full approval
    /// history for the query surface.
    pub async fn find_with_receipts(
        &self,
        liquidation_id: Uuid,
    ) -> Result<(liquidations::Model, Vec<receipts::Model>), LiquidationError> {
        let model = liquidations::Entity::find_by_id(liquidation_id)
            .one(&self.db)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?
            .ok_or(LiquidationError::NotFound(liquidation_id))?;

        let receipt_rows = receipts::Entity::find()
            .filter(receipts::Column::LiquidationId.eq(liquidation_id))
            .order_by_asc(receipts::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        Ok((model, receipt_rows))
    }

    /// Returns the liquidations waiting on one approval level, oldest
    /// first.
    pub async fn pending_for_level(
        &self,
        level: ApprovalLevel,
        page: &PageRequest,
    ) -> Result<Vec<liquidations::Model>, LiquidationError> {
        liquidations::Entity::find()
            .filter(
                liquidations::Column::Status
                    .eq(convert::liq_status_to_db(level.pending_status())),
            )
            .order_by_asc(liquidations::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Loads a liquidation and its receipts under an exclusive row
    /// lock, converted to the core aggregate.
    async fn load_locked(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        liquidation_id: Uuid,
    ) -> Result<Liquidation, LiquidationError> {
        let model = liquidations::Entity::find_by_id(liquidation_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?
            .ok_or(LiquidationError::NotFound(liquidation_id))?;

        let receipt_rows = receipts::Entity::find()
            .filter(receipts::Column::LiquidationId.eq(liquidation_id))
            .order_by_asc(receipts::Column::CreatedAt)
            .all(txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        convert::liquidation_to_core(&model, &receipt_rows).map_err(LiquidationError::Database)
    }

    /// Sums the claims of the disbursement's in-flight liquidations.
    /// Approved claims already live in the ledger; rejected ones are
    /// released.
    async fn outstanding_claims(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        disbursement_id: Uuid,
    ) -> Result<Money, LiquidationError> {
        let claims: Vec<rust_decimal::Decimal> = liquidations::Entity::find()
            .filter(liquidations::Column::DisbursementId.eq(disbursement_id))
            .filter(liquidations::Column::Status.is_not_in([
                sea_orm_active_enums::LiquidationStatus::Approved,
                sea_orm_active_enums::LiquidationStatus::Rejected,
            ]))
            .select_only()
            .column(liquidations::Column::ClaimedAmount)
            .into_tuple()
            .all(txn)
            .await
            .map_err(|e| LiquidationError::Database(e.to_string()))?;

        claims
            .into_iter()
            .try_fold(Money::ZERO, |acc, claim| {
                let claim = convert::money(claim, "claimed_amount")?;
                acc.checked_add(claim)
                    .ok_or_else(|| "claim total overflow".to_string())
            })
            .map_err(LiquidationError::Database)
    }
}
