use std::{path::Path, sync::Arc};

use compplan_model::{params::PlanParams, Cadence, SettlementPeriod, Snapshot};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::{fs, io::AsyncWriteExt};

use crate::{config::Config, plan::PlanFile};

/// The period to settle.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PeriodArgs {
    /// Period key, e.g. `2026-01`.
    #[arg(long)]
    period: String,
    /// Start of the period (RFC 3339, inclusive).
    #[arg(long, value_parser = parse_datetime)]
    from: OffsetDateTime,
    /// End of the period (RFC 3339, exclusive).
    #[arg(long, value_parser = parse_datetime)]
    to: OffsetDateTime,
    /// Settlement cadence.
    #[arg(long, default_value_t = Cadence::Monthly)]
    cadence: Cadence,
}

impl PeriodArgs {
    pub(crate) fn period(&self) -> eyre::Result<SettlementPeriod> {
        Ok(SettlementPeriod::try_new(
            self.period.clone(),
            self.from,
            self.to,
            self.cadence,
        )?)
    }
}

fn parse_datetime(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(value, &Rfc3339)
}

pub(crate) async fn read_snapshot(path: &Path) -> eyre::Result<Snapshot> {
    let content = fs::read(path)
        .await
        .map_err(|err| eyre::eyre!("failed to read snapshot `{}`: {err}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_slice(&content)?;
    tracing::info!(
        participants = snapshot.participants.len(),
        orders = snapshot.orders.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Select the plan version in effect for `period`.
pub(crate) async fn plan_for(
    config: &Config,
    period: &SettlementPeriod,
) -> eyre::Result<Arc<PlanParams>> {
    let registry = PlanFile::read(config.plan()).await?.into_registry()?;
    let plan = registry.plan_for(period)?;
    tracing::info!(version = plan.version(), period = %period.key(), "plan selected");
    Ok(plan)
}

/// Write `content` to `path`, refusing to replace an existing file unless
/// `force` is set.
pub(crate) async fn write_new_file(path: &Path, content: &str, force: bool) -> eyre::Result<()> {
    if fs::try_exists(path).await? && !force {
        eyre::bail!(
            "`{}` already exists. Use `--force` to overwrite it.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
