//! Periodic job runner: allowance recalculation and ledger repair.
//!
//! Invoked on a schedule (cron) or on demand:
//!   recalc                              - recalculate all pending allowances
//!   recalc --beneficiary <uuid>         - recalculate one beneficiary
//!   recalc --repair-ledger              - re-derive every disbursement ledger
//!
//! Each beneficiary (and each disbursement in repair mode) is an
//! independent unit of work; failures are reported at the end without
//! aborting the sweep.

use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use almoner_db::{
    connect, RecalcRepository, ReconciliationRepository, SqlAttendanceProvider,
};
use almoner_shared::AppConfig;

#[derive(Debug)]
enum Mode {
    Recalculate { beneficiary: Option<Uuid> },
    RepairLedger,
}

fn parse_args() -> anyhow::Result<Mode> {
    let mut args = std::env::args().skip(1);
    let mut beneficiary = None;
    let mut repair = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--beneficiary" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--beneficiary requires a UUID"))?;
                beneficiary = Some(value.parse()?);
            }
            "--repair-ledger" => repair = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    if repair {
        anyhow::ensure!(
            beneficiary.is_none(),
            "--repair-ledger does not take a beneficiary"
        );
        Ok(Mode::RepairLedger)
    } else {
        Ok(Mode::Recalculate { beneficiary })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almoner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mode = parse_args()?;
    let config = AppConfig::load()?;
    let db = connect(&config.database.url).await?;

    let failures = match mode {
        Mode::Recalculate { beneficiary } => {
            let provider = SqlAttendanceProvider::new(db.clone());
            let repo = RecalcRepository::new(db);
            let report = repo.run(&provider, beneficiary).await?;

            info!(
                updated = report.updated_count,
                beneficiaries = report.results.len(),
                failures = report.failure_count,
                "allowance recalculation finished"
            );
            for item in report.results.iter().filter(|r| r.error.is_some()) {
                warn!(
                    beneficiary = %item.beneficiary_id,
                    error = item.error.as_deref().unwrap_or_default(),
                    "beneficiary recalculation failed"
                );
            }
            report.failure_count
        }
        Mode::RepairLedger => {
            let repo = ReconciliationRepository::new(db);
            let report = repo.repair_all().await?;

            info!(
                recomputed = report.success_count,
                failures = report.failure_count,
                "ledger repair finished"
            );
            for item in report.results.iter().filter(|r| r.error.is_some()) {
                error!(
                    disbursement = %item.disbursement_id,
                    error = item.error.as_deref().unwrap_or_default(),
                    "disbursement recompute failed"
                );
            }
            report.failure_count
        }
    };

    if failures > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
