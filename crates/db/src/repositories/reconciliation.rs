//! Disbursement ledger reconciliation against the authoritative
//! liquidation rows.
//!
//! One code path serves every caller: the inline recompute after a
//! final liquidation approval, the standalone repair of a single
//! disbursement, and the administrative full-table sweep.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use almoner_core::disbursement::types::LedgerSnapshot;
use almoner_core::disbursement::DisbursementError;
use almoner_core::reconciliation::ReconciliationEngine;
use almoner_shared::types::Money;

use crate::entities::{disbursements, liquidations, sea_orm_active_enums};

use super::convert;

/// Outcome of one disbursement in a repair sweep.
#[derive(Debug, Clone)]
pub struct RepairItemResult {
    /// The disbursement that was recomputed.
    pub disbursement_id: Uuid,
    /// Whether the recompute succeeded.
    pub success: bool,
    /// Error message if it failed.
    pub error: Option<String>,
}

/// Result of a full repair sweep.
#[derive(Debug, Clone)]
pub struct RepairReport {
    /// Results for each disbursement.
    pub results: Vec<RepairItemResult>,
    /// Number of successful recomputes.
    pub success_count: usize,
    /// Number of failed recomputes.
    pub failure_count: usize,
}

/// Repository for ledger reconciliation.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Re-derives one disbursement's liquidation totals.
    ///
    /// Takes the same row lock as the approval path, so a repair run
    /// never races an in-flight approval.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and `Database` on storage
    /// failures.
    pub async fn recompute_disbursement(
        &self,
        disbursement_id: Uuid,
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

        let updated = recompute_locked(&txn, model)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Re-derives the liquidation totals of every disbursement.
    ///
    /// Each disbursement is an independent unit: one failure is
    /// captured in the report and the sweep continues.
    ///
    /// # Errors
    ///
    /// Returns `Database` only if the id listing itself fails.
    pub async fn repair_all(&self) -> Result<RepairReport, DisbursementError> {
        let ids: Vec<Uuid> = disbursements::Entity::find()
            .select_only()
            .column(disbursements::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| DisbursementError::Database(e.to_string()))?;

        let mut results = Vec::with_capacity(ids.len());
        let mut success_count = 0;
        let mut failure_count = 0;

        for id in ids {
            match self.recompute_disbursement(id).await {
                Ok(_) => {
                    success_count += 1;
                    results.push(RepairItemResult {
                        disbursement_id: id,
                        success: true,
                        error: None,
                    });
                }
                Err(e) => {
                    failure_count += 1;
                    results.push(RepairItemResult {
                        disbursement_id: id,
                        success: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(RepairReport {
            results,
            success_count,
            failure_count,
        })
    }
}

/// Recomputes a disbursement's derived ledger fields inside the
/// caller's transaction. The caller must already hold the row lock.
pub(crate) async fn recompute_locked<C: ConnectionTrait>(
    conn: &C,
    model: disbursements::Model,
) -> Result<disbursements::Model, DbErr> {
    let approved_rows = liquidations::Entity::find()
        .filter(liquidations::Column::DisbursementId.eq(model.id))
        .filter(
            liquidations::Column::Status.eq(sea_orm_active_enums::LiquidationStatus::Approved),
        )
        .all(conn)
        .await?;

    let approved_claims = approved_rows
        .iter()
        .map(|l| convert::money(l.receipt_total, "receipt_total"))
        .collect::<Result<Vec<Money>, _>>()
        .map_err(DbErr::Custom)?;

    let amount = convert::money(model.amount, "amount").map_err(DbErr::Custom)?;
    let previous = LedgerSnapshot {
        liquidated_amount: convert::money(model.liquidated_amount, "liquidated_amount")
            .map_err(DbErr::Custom)?,
        remaining_to_liquidate: convert::money(
            model.remaining_to_liquidate,
            "remaining_to_liquidate",
        )
        .map_err(DbErr::Custom)?,
        fully_liquidated: model.fully_liquidated,
        fully_liquidated_at: model.fully_liquidated_at.map(|t| t.with_timezone(&Utc)),
    };

    let snapshot = ReconciliationEngine::recompute(amount, &approved_claims, &previous);

    let mut active: disbursements::ActiveModel = model.into();
    active.liquidated_amount = Set(snapshot.liquidated_amount.amount());
    active.remaining_to_liquidate = Set(snapshot.remaining_to_liquidate.amount());
    active.fully_liquidated = Set(snapshot.fully_liquidated);
    active.fully_liquidated_at = Set(snapshot.fully_liquidated_at.map(Into::into));
    active.updated_at = Set(Utc::now().into());

    active.update(conn).await
}
