//! Periodic allowance recalculation over pending cost-of-living
//! requests.
//!
//! Each beneficiary is an independent unit of work: one failure is
//! captured in the report and the sweep continues with the next
//! beneficiary.

use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use almoner_core::aid_request::service::AidRequestService;
use almoner_core::aid_request::AidRequestError;
use almoner_core::ports::AttendanceProvider;

use crate::entities::{aid_requests, sea_orm_active_enums};

use super::convert;

/// Outcome of one beneficiary in a recalculation sweep.
#[derive(Debug, Clone)]
pub struct RecalcItemResult {
    /// The beneficiary that was processed.
    pub beneficiary_id: Uuid,
    /// Requests whose amount changed.
    pub updated: usize,
    /// Requests left alone (no attendance data, or amount unchanged).
    pub skipped: usize,
    /// Error message if the beneficiary's unit of work failed.
    pub error: Option<String>,
}

/// Result of a recalculation sweep.
#[derive(Debug, Clone)]
pub struct RecalcReport {
    /// Results per beneficiary.
    pub results: Vec<RecalcItemResult>,
    /// Total requests updated across all beneficiaries.
    pub updated_count: usize,
    /// Number of beneficiaries whose unit of work failed.
    pub failure_count: usize,
}

/// Repository for the periodic recalculation job.
#[derive(Debug, Clone)]
pub struct RecalcRepository {
    db: DatabaseConnection,
}

impl RecalcRepository {
    /// Creates a new recalculation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Recalculates pending cost-of-living amounts from attendance.
    ///
    /// Scoped to one beneficiary when `scope` is set, otherwise to
    /// every beneficiary with a pending cost-of-living request. Zero
    /// matching requests is a no-op with an empty report. Idempotent:
    /// amounts are derived from the provider's data, never
    /// accumulated.
    ///
    /// # Errors
    ///
    /// Returns `Database` only if the initial listing fails;
    /// per-beneficiary failures are captured in the report.
    pub async fn run<P: AttendanceProvider>(
        &self,
        provider: &P,
        scope: Option<Uuid>,
    ) -> Result<RecalcReport, AidRequestError> {
        let mut query = aid_requests::Entity::find()
            .filter(
                aid_requests::Column::FundCategory
                    .eq(sea_orm_active_enums::FundCategory::CostOfLiving),
            )
            .filter(aid_requests::Column::Stage.eq(sea_orm_active_enums::ReviewStage::Caseworker))
            .filter(
                aid_requests::Column::CaseworkerDecision
                    .eq(sea_orm_active_enums::StageDecision::Pending),
            );
        if let Some(beneficiary_id) = scope {
            query = query.filter(aid_requests::Column::BeneficiaryId.eq(beneficiary_id));
        }

        let pending = query
            .all(&self.db)
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?;

        let mut by_beneficiary: BTreeMap<Uuid, Vec<aid_requests::Model>> = BTreeMap::new();
        for request in pending {
            by_beneficiary
                .entry(request.beneficiary_id)
                .or_default()
                .push(request);
        }

        let mut results = Vec::with_capacity(by_beneficiary.len());
        let mut updated_count = 0;
        let mut failure_count = 0;

        for (beneficiary_id, requests) in by_beneficiary {
            match self
                .recalculate_beneficiary(provider, beneficiary_id, &requests)
                .await
            {
                Ok((updated, skipped)) => {
                    updated_count += updated;
                    results.push(RecalcItemResult {
                        beneficiary_id,
                        updated,
                        skipped,
                        error: None,
                    });
                }
                Err(e) => {
                    failure_count += 1;
                    results.push(RecalcItemResult {
                        beneficiary_id,
                        updated: 0,
                        skipped: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(RecalcReport {
            results,
            updated_count,
            failure_count,
        })
    }

    /// One beneficiary's unit of work: its own transaction, so a
    /// failure here cannot disturb other beneficiaries.
    async fn recalculate_beneficiary<P: AttendanceProvider>(
        &self,
        provider: &P,
        beneficiary_id: Uuid,
        requests: &[aid_requests::Model],
    ) -> Result<(usize, usize), AidRequestError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?;

        let mut updated = 0;
        let mut skipped = 0;

        for model in requests {
            // Re-read under the lock; the queue snapshot may be stale.
            let Some(current) = aid_requests::Entity::find_by_id(model.id)
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(|e| AidRequestError::Database(e.to_string()))?
            else {
                skipped += 1;
                continue;
            };

            let request =
                convert::aid_request_to_core(&current).map_err(AidRequestError::Database)?;
            let Some(period) = request.period else {
                skipped += 1;
                continue;
            };

            let attendance = provider
                .attendance(beneficiary_id, period)
                .await
                .map_err(|e| AidRequestError::Database(e.to_string()))?;
            let Some(attendance) = attendance else {
                skipped += 1;
                continue;
            };

            let (recalculated, changed) =
                AidRequestService::recalculate_amount(request, &attendance);
            if changed {
                convert::aid_request_to_active(&recalculated)
                    .update(&txn)
                    .await
                    .map_err(|e| AidRequestError::Database(e.to_string()))?;
                updated += 1;
            } else {
                skipped += 1;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AidRequestError::Database(e.to_string()))?;

        Ok((updated, skipped))
    }
}
