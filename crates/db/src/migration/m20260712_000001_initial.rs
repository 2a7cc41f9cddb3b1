//! Initial schema: aid requests, disbursements, liquidations, receipts,
//! and the attendance summary mirror.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS receipts CASCADE;
DROP TABLE IF EXISTS liquidations CASCADE;
DROP TABLE IF EXISTS disbursements CASCADE;
DROP TABLE IF EXISTS aid_requests CASCADE;
DROP TABLE IF EXISTS attendance_summaries CASCADE;
DROP TYPE IF EXISTS verification_status;
DROP TYPE IF EXISTS approval_level;
DROP TYPE IF EXISTS liquidation_status;
DROP TYPE IF EXISTS disbursement_status;
DROP TYPE IF EXISTS stage_decision;
DROP TYPE IF EXISTS review_stage;
DROP TYPE IF EXISTS fund_category;
",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Enum types
CREATE TYPE fund_category AS ENUM ('tuition', 'cost_of_living', 'other');
CREATE TYPE review_stage AS ENUM ('caseworker', 'finance', 'director', 'done');
CREATE TYPE stage_decision AS ENUM ('pending', 'approved', 'rejected');
CREATE TYPE disbursement_status AS ENUM (
    'pending', 'finance_disbursed', 'caseworker_received',
    'caseworker_disbursed', 'beneficiary_received'
);
CREATE TYPE liquidation_status AS ENUM (
    'pending', 'in_progress', 'complete',
    'pending_caseworker_approval', 'pending_finance_approval',
    'pending_director_approval', 'approved', 'rejected'
);
CREATE TYPE approval_level AS ENUM ('caseworker', 'finance', 'director');
CREATE TYPE verification_status AS ENUM ('pending', 'verified', 'questioned');

-- Aid requests: three-stage review of a funding request
CREATE TABLE aid_requests (
    id UUID PRIMARY KEY,
    beneficiary_id UUID NOT NULL,
    unit_id UUID,
    fund_category fund_category NOT NULL,
    -- Zero is reachable: recalculation can derive a zero allowance for
    -- a month with no attendance.
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    period_month SMALLINT CHECK (period_month BETWEEN 1 AND 12),
    period_year INT,
    purpose TEXT NOT NULL,
    stage review_stage NOT NULL DEFAULT 'caseworker',
    caseworker_decision stage_decision NOT NULL DEFAULT 'pending',
    caseworker_reviewed_by UUID,
    caseworker_reviewed_at TIMESTAMPTZ,
    caseworker_notes TEXT,
    finance_decision stage_decision NOT NULL DEFAULT 'pending',
    finance_reviewed_by UUID,
    finance_reviewed_at TIMESTAMPTZ,
    finance_notes TEXT,
    director_decision stage_decision NOT NULL DEFAULT 'pending',
    director_reviewed_by UUID,
    director_reviewed_at TIMESTAMPTZ,
    director_notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_period_for_col CHECK (
        (fund_category = 'cost_of_living')
            = (period_month IS NOT NULL AND period_year IS NOT NULL)
    )
);

-- One non-rejected cost-of-living request per beneficiary per period
CREATE UNIQUE INDEX uq_aid_requests_open_period
    ON aid_requests (beneficiary_id, period_year, period_month)
    WHERE fund_category = 'cost_of_living'
      AND caseworker_decision <> 'rejected'
      AND finance_decision <> 'rejected'
      AND director_decision <> 'rejected';

-- Role queues scan by stage
CREATE INDEX idx_aid_requests_stage ON aid_requests (stage, created_at DESC);
CREATE INDEX idx_aid_requests_beneficiary ON aid_requests (beneficiary_id, created_at DESC);

-- Disbursements: four-step handoff plus derived liquidation ledger
CREATE TABLE disbursements (
    id UUID PRIMARY KEY,
    aid_request_id UUID NOT NULL REFERENCES aid_requests(id),
    beneficiary_id UUID NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    status disbursement_status NOT NULL DEFAULT 'pending',
    reference_number VARCHAR(64) NOT NULL,
    notes TEXT,
    finance_disbursed_by UUID,
    finance_disbursed_at TIMESTAMPTZ,
    caseworker_received_by UUID,
    caseworker_received_at TIMESTAMPTZ,
    caseworker_disbursed_by UUID,
    caseworker_disbursed_at TIMESTAMPTZ,
    beneficiary_received_by UUID,
    beneficiary_received_at TIMESTAMPTZ,
    liquidated_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    remaining_to_liquidate NUMERIC(14, 2) NOT NULL,
    fully_liquidated BOOLEAN NOT NULL DEFAULT FALSE,
    fully_liquidated_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_ledger_conserved
        CHECK (liquidated_amount + remaining_to_liquidate = amount)
);

-- Exactly one disbursement per aid request
CREATE UNIQUE INDEX uq_disbursements_aid_request ON disbursements (aid_request_id);
CREATE INDEX idx_disbursements_status ON disbursements (status, created_at DESC);
CREATE INDEX idx_disbursements_beneficiary ON disbursements (beneficiary_id);

-- Liquidations: expense accounting with three-tier approval
CREATE TABLE liquidations (
    id UUID PRIMARY KEY,
    disbursement_id UUID NOT NULL REFERENCES disbursements(id),
    beneficiary_id UUID NOT NULL,
    fund_category fund_category NOT NULL,
    claimed_amount NUMERIC(14, 2) NOT NULL CHECK (claimed_amount > 0),
    receipt_total NUMERIC(14, 2) NOT NULL DEFAULT 0,
    remaining_amount NUMERIC(14, 2) NOT NULL,
    is_complete BOOLEAN NOT NULL DEFAULT FALSE,
    status liquidation_status NOT NULL DEFAULT 'pending',
    caseworker_approved_by UUID,
    caseworker_approved_at TIMESTAMPTZ,
    caseworker_notes TEXT,
    finance_approved_by UUID,
    finance_approved_at TIMESTAMPTZ,
    finance_notes TEXT,
    director_approved_by UUID,
    director_approved_at TIMESTAMPTZ,
    director_notes TEXT,
    rejected_at_level approval_level,
    rejection_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rejection_fields CHECK (
        (status = 'rejected') = (rejected_at_level IS NOT NULL)
    )
);

CREATE INDEX idx_liquidations_disbursement ON liquidations (disbursement_id);
CREATE INDEX idx_liquidations_status ON liquidations (status, created_at DESC);
CREATE INDEX idx_liquidations_beneficiary ON liquidations (beneficiary_id, created_at DESC);

-- Receipts: evidence owned by a liquidation
CREATE TABLE receipts (
    id UUID PRIMARY KEY,
    liquidation_id UUID NOT NULL REFERENCES liquidations(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    receipt_number VARCHAR(64) NOT NULL,
    receipt_date DATE NOT NULL,
    description TEXT,
    file_ref TEXT,
    verification_status verification_status NOT NULL DEFAULT 'pending',
    verification_notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_receipts_liquidation ON receipts (liquidation_id);

-- Attendance summaries, synced in by the external attendance system
CREATE TABLE attendance_summaries (
    id UUID PRIMARY KEY,
    beneficiary_id UUID NOT NULL,
    period_month SMALLINT NOT NULL CHECK (period_month BETWEEN 1 AND 12),
    period_year INT NOT NULL,
    attended_days INT NOT NULL CHECK (attended_days >= 0),
    daily_rate NUMERIC(14, 2) NOT NULL CHECK (daily_rate >= 0),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX uq_attendance_period
    ON attendance_summaries (beneficiary_id, period_year, period_month);
";
