//! Aid request repository: submission, stage review, and role queues.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use almoner_core::aid_request::service::{AidRequestService, SubmitAidRequestInput};
use almoner_core::aid_request::types::{ReviewDecision, ReviewStage};
use almoner_core::aid_request::AidRequestError;
use almoner_core::ports::{
    AuditRecord, AuditSink, EntityKind, Notification, NotificationKind, NotificationSink,
};
use almoner_core::role::ActorRole;
use almoner_shared::types::PageRequest;

use crate::entities::{aid_requests, sea_orm_active_enums};
use crate::sinks::{TracingAuditSink, TracingNotificationSink};

use super::convert;

/// Repository for aid request lifecycle operations.
#[derive(Debug, Clone)]
pub struct AidRequestRepository<N = TracingNotificationSink, A = TracingAuditSink> {
    db: DatabaseConnection,
    notifier: N,
    audit: A,
}

impl AidRequestRepository {
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

impl<N: NotificationSink, A: AuditSink> AidRequestRepository<N, A> {
    /// Creates a repository with custom notification and audit sinks.
    #[must_use]
    pub const fn with_sinks(db: DatabaseConnection, notifier: N, audit: A) -> Self {
        Self {
            db,
            notifier,
            audit,
        }
    }

    /// Submits a new aid request.
    ///
    /// The duplicate-period rule for cost-of-living requests is
    /// evaluated inside the transaction and additionally enforced by a
    /// partial unique index, so two concurrent submissions cannot both
    /// land.
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePeriodRequest` if a non-rejected request
    /// already covers the beneficiary's period, plus the validation
    /// errors of `AidRequestService::submit`.
    pub async fn submit(
        &self,
        input: SubmitAidRequestInput,
    ) -> Result<aid_requests::Model, AidRequestError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?;

        let has_open_period_request = match input.period {
            Some(period) => {
                let open = aid_requests::Entity::find()
                    .filter(aid_requests::Column::BeneficiaryId.eq(input.beneficiary_id))
                    .filter(
                        aid_requests::Column::FundCategory
                            .eq(sea_orm_active_enums::FundCategory::CostOfLiving),
                    )
                    .filter(aid_requests::Column::PeriodYear.eq(period.year))
                    .filter(aid_requests::Column::PeriodMonth.eq(i16::from(period.month)))
                    .filter(
                        aid_requests::Column::CaseworkerDecision
                            .ne(sea_orm_active_enums::StageDecision::Rejected),
                    )
                    .filter(
                        aid_requests::Column::FinanceDecision
                            .ne(sea_orm_active_enums::StageDecision::Rejected),
                    )
                    .filter(
                        aid_requests::Column::DirectorDecision
                            .ne(sea_orm_active_enums::StageDecision::Rejected),
                    )
                    .count(&txn)
                    .await
                    .map_err(|e| AidRequestError::Database(e.to_string()))?;
                open > 0
            }
            None => false,
        };

        let period = input.period;
        let request = AidRequestService::submit(input, has_open_period_request)?;

        let inserted = convert::aid_request_to_active(&request)
            .insert(&txn)
            .await
            .map_err(|e| {
                // The partial unique index catches submissions racing past
                // the in-transaction check.
                if e.to_string().contains("uq_aid_requests_open_period") {
                    match period {
                        Some(period) => AidRequestError::DuplicatePeriodRequest { period },
                        None => AidRequestError::Database(e.to_string()),
                    }
                } else {
                    AidRequestError::Database(e.to_string())
                }
            })?;

        txn.commit()
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?;

        self.audit
            .record(AuditRecord {
                event: "aid_request.submitted".to_string(),
                entity_kind: EntityKind::AidRequest,
                entity_id: inserted.id,
                actor: Some(inserted.beneficiary_id),
                summary: format!("submitted {} request", request.category),
                at: Utc::now(),
            })
            .await;

        Ok(inserted)
    }

    /// Records a stage decision on an aid request.
    ///
    /// The row is locked before the precondition check, so a racing
    /// reviewer fails with `AlreadyDecided` rather than overwriting.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, plus the transition errors
    /// of `AidRequestService::review`.
    pub async fn review(
        &self,
        request_id: Uuid,
        actor_role: ActorRole,
        reviewer: Uuid,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<aid_requests::Model, AidRequestError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?;

        let model = aid_requests::Entity::find_by_id(request_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?
            .ok_or(AidRequestError::NotFound(request_id))?;

        let request = convert::aid_request_to_core(&model).map_err(AidRequestError::Database)?;
        let before_stage = request.stage;
        let updated = AidRequestService::review(request, actor_role, reviewer, decision, notes)?;

        let saved = convert::aid_request_to_active(&updated)
            .update(&txn)
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?;

        let outcome = match decision {
            ReviewDecision::Approve => "approved",
            ReviewDecision::Reject => "rejected",
        };
        self.audit
            .record(AuditRecord {
                event: "aid_request.reviewed".to_string(),
                entity_kind: EntityKind::AidRequest,
                entity_id: saved.id,
                actor: Some(reviewer),
                summary: format!(
                    "{actor_role} {outcome}; stage {before_stage} -> {}",
                    updated.stage
                ),
                at: Utc::now(),
            })
            .await;
        self.notifier
            .notify(Notification {
                recipient_id: saved.beneficiary_id,
                kind: NotificationKind::AidRequestDecided,
                entity_id: saved.id,
                message: format!("Your aid request was {outcome} at the {actor_role} stage"),
            })
            .await;

        Ok(saved)
    }

    /// Returns the requests waiting on a role's decision, oldest first,
    /// optionally scoped to one facility unit.
    ///
    /// Roles that own no review stage get an empty queue.
    pub async fn pending_for_role(
        &self,
        role: ActorRole,
        unit_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<Vec<aid_requests::Model>, AidRequestError> {
        let Some(stage) = ReviewStage::owned_by(role) else {
            return Ok(vec![]);
        };

        let mut query = aid_requests::Entity::find()
            .filter(aid_requests::Column::Stage.eq(convert::stage_to_db(stage)));
        // Frozen requests keep their cursor; exclude anything decided.
        query = match stage {
            ReviewStage::Caseworker => query.filter(
                aid_requests::Column::CaseworkerDecision
                    .eq(sea_orm_active_enums::StageDecision::Pending),
            ),
            ReviewStage::Finance => query.filter(
                aid_requests::Column::FinanceDecision
                    .eq(sea_orm_active_enums::StageDecision::Pending),
            ),
            ReviewStage::Director => query.filter(
                aid_requests::Column::DirectorDecision
                    .eq(sea_orm_active_enums::StageDecision::Pending),
            ),
            ReviewStage::Done => return Ok(vec![]),
        };
        if let Some(unit_id) = unit_id {
            query = query.filter(aid_requests::Column::UnitId.eq(unit_id));
        }

        query
            .order_by_asc(aid_requests::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))
    }

    /// Fetches one aid request with its full decision history.
    pub async fn find(&self, request_id: Uuid) -> Result<aid_requests::Model, AidRequestError> {
        aid_requests::Entity::find_by_id(request_id)
            .one(&self.db)
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?
            .ok_or(AidRequestError::NotFound(request_id))
    }

    /// Lists a beneficiary's requests, newest first.
    pub async fn list_for_beneficiary(
        &self,
        beneficiary_id: Uuid,
        page: &PageRequest,
    ) -> Result<Vec<aid_requests::Model>, AidRequestError> {
        aid_requests::Entity::find()
            .filter(aid_requests::Column::BeneficiaryId.eq(beneficiary_id))
            .order_by_desc(aid_requests::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))
    }
}
