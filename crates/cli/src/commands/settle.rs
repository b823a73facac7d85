use std::path::PathBuf;

use compplan_model::{LedgerExt, Settlement, SettlementReport};
use rust_decimal::Decimal;

use crate::{config::DisplayOptions, ledger::FileLedger};

use super::{
    utils::{plan_for, read_snapshot, PeriodArgs},
    Command, Context,
};

/// Settle a period.
#[derive(Debug, clap::Args)]
pub struct Settle {
    /// Path to the snapshot (JSON with `participants` and `orders`).
    #[arg(long)]
    snapshot: PathBuf,
    #[command(flatten)]
    period: PeriodArgs,
    /// Also print every commission record.
    #[arg(long)]
    records: bool,
}

impl Command for Settle {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let period = self.period.period()?;
        let snapshot = read_snapshot(&self.snapshot).await?;
        let plan = plan_for(ctx.config(), &period).await?;
        let ledger = FileLedger::new(ctx.config().ledger_dir());

        let report = tokio::task::spawn_blocking(move || {
            let network = snapshot.network()?;
            let settlement = Settlement::try_new(&network, &snapshot.orders, period, plan)?;
            ledger.settle(settlement)
        })
        .await??;

        let output = ctx.config().output();
        println!(
            "{}",
            output.display_one(Summary::new(&report)?, DisplayOptions::default())?
        );
        println!(
            "{}",
            output.display_many(report.payouts(), payout_projection())?
        );
        if self.records {
            println!(
                "{}",
                output.display_many(report.records(), record_projection())?
            );
        }
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct Summary<'a> {
    period: &'a str,
    plan_version: u32,
    company_volume: Decimal,
    participants: usize,
    records: usize,
    payouts: usize,
    total_payable: Decimal,
    forfeited: Decimal,
    rolled_up: Decimal,
    withheld: Decimal,
    promotions: usize,
    demotions: usize,
}

impl<'a> Summary<'a> {
    fn new(report: &'a SettlementReport) -> eyre::Result<Self> {
        let promotions = report
            .rank_changes()
            .iter()
            .filter(|change| change.is_promotion())
            .count();
        Ok(Self {
            period: report.period().key(),
            plan_version: report.plan_version(),
            company_volume: *report.company_volume(),
            participants: report.standings().len(),
            records: report.records().len(),
            payouts: report.payouts().len(),
            total_payable: report.total_payable()?,
            forfeited: *report.forfeited(),
            rolled_up: *report.rolled_up(),
            withheld: *report.withheld(),
            promotions,
            demotions: report.rank_changes().len().saturating_sub(promotions),
        })
    }
}

pub(super) fn payout_projection() -> DisplayOptions {
    DisplayOptions::table_projection([
        ("participant", "participant"),
        ("gross", "gross"),
        ("total", "total"),
    ])
}

fn record_projection() -> DisplayOptions {
    DisplayOptions::table_projection([
        ("recipient", "recipient"),
        ("bonus.kind", "bonus"),
        ("amount", "amount"),
        ("source.type", "source"),
        ("source.id", "source id"),
        ("rolled_up_from", "rolled up from"),
    ])
}
