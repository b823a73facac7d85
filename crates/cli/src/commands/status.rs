use compplan_model::Ledger;
use eyre::OptionExt;

use crate::{config::DisplayOptions, ledger::FileLedger};

use super::{settle::payout_projection, Command, Context};

/// Show the run status of a period.
#[derive(Debug, clap::Args)]
pub struct Status {
    /// Period key.
    #[arg(long)]
    period: String,
}

impl Command for Status {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let ledger = FileLedger::new(ctx.config().ledger_dir());
        let period = self.period.clone();
        let status = tokio::task::spawn_blocking(move || ledger.status(&period)).await??;
        println!(
            "{}",
            ctx.config()
                .output()
                .display_one(&status, DisplayOptions::default())?
        );
        Ok(())
    }
}

/// Show the payouts of a settled period.
#[derive(Debug, clap::Args)]
pub struct Payouts {
    /// Period key.
    #[arg(long)]
    period: String,
    /// Only show this participant.
    #[arg(long)]
    participant: Option<u64>,
}

impl Command for Payouts {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let ledger = FileLedger::new(ctx.config().ledger_dir());
        let period = self.period.clone();
        let report = tokio::task::spawn_blocking(move || ledger.report(&period))
            .await??
            .ok_or_eyre("the period has not been settled")?;
        let payouts = report.payouts().iter().filter(|payout| {
            self.participant
                .map_or(true, |id| payout.participant().0 == id)
        });
        println!(
            "{}",
            ctx.config()
                .output()
                .display_many(payouts, payout_projection())?
        );
        Ok(())
    }
}
