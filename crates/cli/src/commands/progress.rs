use std::path::PathBuf;

use compplan_model::{ParticipantId, Settlement};

use crate::config::DisplayOptions;

use super::{
    utils::{plan_for, read_snapshot, PeriodArgs},
    Command, Context,
};

/// Preview standings for a period.
#[derive(Debug, clap::Args)]
pub struct Progress {
    /// Path to the snapshot (JSON with `participants` and `orders`).
    #[arg(long)]
    snapshot: PathBuf,
    #[command(flatten)]
    period: PeriodArgs,
    /// Only show this participant.
    #[arg(long)]
    participant: Option<u64>,
}

impl Command for Progress {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let period = self.period.period()?;
        let snapshot = read_snapshot(&self.snapshot).await?;
        let plan = plan_for(ctx.config(), &period).await?;

        let report = tokio::task::spawn_blocking(move || {
            let network = snapshot.network()?;
            Settlement::try_new(&network, &snapshot.orders, period, plan)?.execute()
        })
        .await??;

        let standings = report.standings().iter().filter(|standing| {
            self.participant
                .map_or(true, |id| standing.participant == ParticipantId(id))
        });
        let output = ctx.config().output();
        println!(
            "{}",
            output.display_many(
                standings,
                DisplayOptions::table_projection([
                    ("participant", "participant"),
                    ("active", "active"),
                    ("balanced", "balanced"),
                    ("previous_rank", "previous"),
                    ("paid_as_rank", "paid as"),
                    ("volumes.personal", "pv"),
                    ("volumes.left_leg", "left"),
                    ("volumes.right_leg", "right"),
                    ("progress.next", "next"),
                    ("progress.personal", "pv %"),
                    ("progress.team", "team %"),
                    ("progress.leg", "leg %"),
                ]),
            )?
        );
        Ok(())
    }
}
